use crate::{NbtReader, NbtWriter, Result, Tag};

#[test]
fn int_and_byte_list_scenario() -> Result<()> {
    let mut writer = NbtWriter::new(Vec::new());
    writer.name(b"")?;
    writer.start_compound()?;
    writer.name(b"x")?;
    writer.write_int(42)?;
    writer.name(b"y")?;
    writer.start_list(2, Tag::Byte)?;
    writer.write_byte(1)?;
    writer.write_byte(2)?;
    writer.end_list()?;
    writer.end_compound()?;
    let payload = writer.into_inner();

    let mut reader = NbtReader::new(payload.as_slice());
    assert_eq!(reader.read_name()?, Some((Tag::Compound, b"".to_vec())));
    reader.start_compound()?;
    assert_eq!(reader.read_name()?, Some((Tag::Int, b"x".to_vec())));
    assert_eq!(reader.read_int()?, 42);
    assert_eq!(reader.read_name()?, Some((Tag::List, b"y".to_vec())));
    assert_eq!(reader.start_list()?, (Tag::Byte, 2));
    assert_eq!(reader.read_byte()?, 1);
    assert_eq!(reader.read_byte()?, 2);
    reader.end_list()?;
    assert_eq!(reader.read_name()?, None);
    reader.end_compound()?;
    Ok(())
}

#[test]
fn full_operation_set() -> Result<()> {
    let mut writer = NbtWriter::new(Vec::new());
    writer.name(b"root")?;
    writer.start_compound()?;
    writer.name(b"byte")?;
    writer.write_byte(-5)?;
    writer.name(b"short")?;
    writer.write_short(300)?;
    writer.name(b"int")?;
    writer.write_int(-70000)?;
    writer.name(b"long")?;
    writer.write_long(1 << 40)?;
    writer.name(b"float")?;
    writer.write_float(0.5)?;
    writer.name(b"double")?;
    writer.write_double(-2.25)?;
    writer.name(b"string")?;
    writer.write_string("snowy taiga \u{1f332}".as_bytes())?;
    writer.name(b"bytes")?;
    writer.write_byte_array(&[0xde, 0xad, 0xbe, 0xef])?;
    writer.name(b"ints")?;
    writer.write_int_array(&[3, 2, 1])?;
    writer.name(b"longs")?;
    writer.write_long_array(&[-9, 9])?;
    writer.name(b"nested")?;
    writer.start_compound()?;
    writer.name(b"lists")?;
    writer.start_list(2, Tag::List)?;
    writer.start_list(1, Tag::Int)?;
    writer.write_int(11)?;
    writer.end_list()?;
    writer.start_list(0, Tag::End)?;
    writer.end_list()?;
    writer.end_list()?;
    writer.end_compound()?;
    writer.end_compound()?;
    let payload = writer.into_inner();

    let mut reader = NbtReader::new(payload.as_slice());
    assert_eq!(reader.read_name()?, Some((Tag::Compound, b"root".to_vec())));
    reader.start_compound()?;
    assert_eq!(reader.read_name()?, Some((Tag::Byte, b"byte".to_vec())));
    assert_eq!(reader.read_byte()?, -5);
    assert_eq!(reader.read_name()?, Some((Tag::Short, b"short".to_vec())));
    assert_eq!(reader.read_short()?, 300);
    assert_eq!(reader.read_name()?, Some((Tag::Int, b"int".to_vec())));
    assert_eq!(reader.read_int()?, -70000);
    assert_eq!(reader.read_name()?, Some((Tag::Long, b"long".to_vec())));
    assert_eq!(reader.read_long()?, 1 << 40);
    assert_eq!(reader.read_name()?, Some((Tag::Float, b"float".to_vec())));
    assert_eq!(reader.read_float()?, 0.5);
    assert_eq!(reader.read_name()?, Some((Tag::Double, b"double".to_vec())));
    assert_eq!(reader.read_double()?, -2.25);
    assert_eq!(reader.read_name()?, Some((Tag::String, b"string".to_vec())));
    assert_eq!(reader.read_string()?, "snowy taiga \u{1f332}".as_bytes());
    assert_eq!(reader.read_name()?, Some((Tag::ByteArray, b"bytes".to_vec())));
    assert_eq!(reader.read_byte_array()?, vec![0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(reader.read_name()?, Some((Tag::IntArray, b"ints".to_vec())));
    assert_eq!(reader.read_int_array()?, vec![3, 2, 1]);
    assert_eq!(reader.read_name()?, Some((Tag::LongArray, b"longs".to_vec())));
    assert_eq!(reader.read_long_array()?, vec![-9, 9]);
    assert_eq!(
        reader.read_name()?,
        Some((Tag::Compound, b"nested".to_vec()))
    );
    reader.start_compound()?;
    assert_eq!(reader.read_name()?, Some((Tag::List, b"lists".to_vec())));
    assert_eq!(reader.start_list()?, (Tag::List, 2));
    assert_eq!(reader.start_list()?, (Tag::Int, 1));
    assert_eq!(reader.read_int()?, 11);
    reader.end_list()?;
    assert_eq!(reader.start_list()?, (Tag::End, 0));
    reader.end_list()?;
    reader.end_list()?;
    assert_eq!(reader.read_name()?, None);
    reader.end_compound()?;
    assert_eq!(reader.read_name()?, None);
    reader.end_compound()?;
    Ok(())
}

#[test]
fn chunked_transfer_any_chunk_sizes() -> Result<()> {
    // Chunk sizes on the two sides are unrelated; the payload must still
    // reconstruct byte for byte.
    let data: Vec<u8> = (0u32..5000).map(|i| (i * 31 % 251) as u8).collect();

    for (write_chunk, read_chunk) in [(1usize, 4096usize), (7, 13), (4096, 1), (500, 500)] {
        let mut writer = NbtWriter::new(Vec::new());
        writer.name(b"blob")?;
        let mut sink = writer.write_byte_array_chunks(data.len())?;
        for chunk in data.chunks(write_chunk) {
            sink.write_chunk(chunk)?;
        }
        sink.finish()?;
        let payload = writer.into_inner();

        let mut reader = NbtReader::new(payload.as_slice());
        reader.read_name()?;
        let mut chunks = reader.read_byte_array_chunks(read_chunk)?;
        let mut collected = Vec::new();
        while let Some(chunk) = chunks.next_chunk()? {
            assert!(chunk.len() <= read_chunk);
            collected.extend_from_slice(&chunk);
        }
        assert_eq!(collected, data);
    }
    Ok(())
}

#[test]
fn gzip_file() -> Result<()> {
    let path = std::env::temp_dir().join("nbtstream-roundtrip-test.dat");

    let mut writer = NbtWriter::create(&path)?;
    writer.name(b"")?;
    writer.start_compound()?;
    writer.name(b"level")?;
    writer.write_string(b"overworld")?;
    writer.name(b"seed")?;
    writer.write_long(-3)?;
    writer.end_compound()?;
    writer.close()?;

    let mut reader = NbtReader::open(&path)?;
    assert_eq!(reader.read_name()?, Some((Tag::Compound, b"".to_vec())));
    reader.start_compound()?;
    assert_eq!(reader.read_name()?, Some((Tag::String, b"level".to_vec())));
    assert_eq!(reader.read_string()?, b"overworld");
    assert_eq!(reader.read_name()?, Some((Tag::Long, b"seed".to_vec())));
    assert_eq!(reader.read_long()?, -3);
    assert_eq!(reader.read_name()?, None);
    reader.end_compound()?;

    std::fs::remove_file(path).ok();
    Ok(())
}
