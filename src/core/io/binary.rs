use std::io::{self, Read, Write};

use derive_more::Constructor;

use crate::core::dna::{pack_pair, unpack_pair};
use crate::core::engine::PairBaseCounts;

// Every table starts with three big-endian i32s: window width (2*window+1),
// position count and a packed flags word:
//
//                      values per record
//  precision bytes  __  |
//        is int? __|    |
//               |  |    |
//  is sparse? __|  |    |
//            |  |  |    |
//  uuuuuuuuuuuu s  i pp nn     (pp = precision-1, nn = values-1)
const SPARSE_BIT: u32 = 32;
const INT_BIT: u32 = 16;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct TableFlags {
    pub sparse: bool,
    pub integer: bool,
    pub precision: u8,
    pub spacing: u8,
}

impl TableFlags {
    pub fn new(sparse: bool, integer: bool, precision: u8, spacing: u8) -> Self {
        assert!((1..=4).contains(&precision), "expecting precision to be between 1 and 4 bytes");
        assert!((1..=4).contains(&spacing), "expecting between 1 and 4 values per record");
        Self { sparse, integer, precision, spacing }
    }

    pub fn pack(&self) -> u32 {
        let mut word = if self.sparse { SPARSE_BIT } else { 0 };
        word |= if self.integer { INT_BIT } else { 0 };
        word |= u32::from(self.precision - 1) << 2;
        word |= u32::from(self.spacing - 1);
        word
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            sparse: word & SPARSE_BIT != 0,
            integer: word & INT_BIT != 0,
            precision: ((word >> 2) & 3) as u8 + 1,
            spacing: (word & 3) as u8 + 1,
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Constructor)]
pub struct TableHeader {
    pub window_width: u32,
    pub positions: u32,
    pub flags: TableFlags,
}

pub fn write_header(mut saveto: impl Write, header: &TableHeader) -> io::Result<()> {
    saveto.write_all(&header.window_width.to_be_bytes())?;
    saveto.write_all(&header.positions.to_be_bytes())?;
    saveto.write_all(&header.flags.pack().to_be_bytes())
}

pub fn read_header(mut reader: impl Read) -> io::Result<TableHeader> {
    let window_width = read_u32(&mut reader)?;
    let positions = read_u32(&mut reader)?;
    let flags = TableFlags::unpack(read_u32(&mut reader)?);
    Ok(TableHeader::new(window_width, positions, flags))
}

// Dense float matrix: one row per position, windowWidth f32 values per row,
// zeros for columns that fall outside [0, positions).
pub fn write_dense_f32(
    mut saveto: impl Write,
    positions: usize,
    window: usize,
    value: impl Fn(usize, usize) -> f32,
) -> io::Result<()> {
    let width = 2 * window + 1;
    let header = TableHeader::new(width as u32, positions as u32, TableFlags::new(false, false, 4, 1));
    write_header(&mut saveto, &header)?;

    for i in 0..positions {
        for dj in -(window as i64)..=(window as i64) {
            let j = i as i64 + dj;
            let datum = if j < 0 || j >= positions as i64 { 0f32 } else { value(i, j as usize) };
            saveto.write_all(&datum.to_be_bytes())?;
        }
    }
    Ok(())
}

pub fn read_dense_f32(mut reader: impl Read) -> io::Result<(TableHeader, Vec<f32>)> {
    let header = read_header(&mut reader)?;
    assert!(!header.flags.sparse && !header.flags.integer, "not a dense float table: {:?}", header.flags);

    let mut body = Vec::with_capacity((header.window_width * header.positions) as usize);
    let mut buf = [0u8; 4];
    while read_record_start(&mut reader, &mut buf)? {
        body.push(f32::from_be_bytes(buf));
    }
    Ok((header, body))
}

// Sparse integer records: a big-endian absolute index followed by N values;
// all-zero records are never written.
pub fn write_sparse_u32<const N: usize>(
    mut saveto: impl Write,
    window_width: usize,
    positions: usize,
    records: impl IntoIterator<Item = (u32, [u32; N])>,
) -> io::Result<()> {
    let header = TableHeader::new(window_width as u32, positions as u32, TableFlags::new(true, true, 4, N as u8));
    write_header(&mut saveto, &header)?;

    for (index, values) in records {
        debug_assert!(values.iter().any(|x| *x != 0));
        saveto.write_all(&index.to_be_bytes())?;
        for value in values {
            saveto.write_all(&value.to_be_bytes())?;
        }
    }
    Ok(())
}

pub fn read_sparse_u32(mut reader: impl Read) -> io::Result<(TableHeader, Vec<(u32, Vec<u32>)>)> {
    let header = read_header(&mut reader)?;
    assert!(
        header.flags.sparse && header.flags.integer && header.flags.precision == 4,
        "not a sparse 4-byte integer table: {:?}",
        header.flags
    );

    let mut records = Vec::new();
    let mut buf = [0u8; 4];
    while read_record_start(&mut reader, &mut buf)? {
        let index = u32::from_be_bytes(buf);
        let mut values = Vec::with_capacity(header.flags.spacing as usize);
        for _ in 0..header.flags.spacing {
            values.push(read_u32(&mut reader)?);
        }
        records.push((index, values));
    }
    Ok((header, records))
}

// Base-pair records: an absolute index, an entry-count byte (1-16), then
// (packed base pair, count) per entry.
pub fn write_pair_counts(
    mut saveto: impl Write,
    window_width: usize,
    positions: usize,
    pairs: &[(u32, PairBaseCounts)],
) -> io::Result<()> {
    let header = TableHeader::new(window_width as u32, positions as u32, TableFlags::new(true, true, 4, 4));
    write_header(&mut saveto, &header)?;

    for (index, counts) in pairs {
        assert!(
            !counts.is_empty() && counts.len() <= 16,
            "a base-pair record must carry between 1 and 16 entries, got {}",
            counts.len()
        );
        saveto.write_all(&index.to_be_bytes())?;
        saveto.write_all(&[counts.len() as u8])?;
        for ((basei, basej), count) in counts {
            saveto.write_all(&[pack_pair(*basei, *basej)])?;
            saveto.write_all(&count.to_be_bytes())?;
        }
    }
    Ok(())
}

pub fn read_pair_counts(mut reader: impl Read) -> io::Result<(TableHeader, Vec<(u32, PairBaseCounts)>)> {
    let header = read_header(&mut reader)?;

    let mut pairs = Vec::new();
    let mut buf = [0u8; 4];
    while read_record_start(&mut reader, &mut buf)? {
        let index = u32::from_be_bytes(buf);

        let mut nentries = [0u8; 1];
        reader.read_exact(&mut nentries)?;

        let mut counts = PairBaseCounts::new();
        for _ in 0..nentries[0] {
            let mut packed = [0u8; 1];
            reader.read_exact(&mut packed)?;
            counts.insert(unpack_pair(packed[0]), read_u32(&mut reader)?);
        }
        pairs.push((index, counts));
    }
    Ok((header, pairs))
}

fn read_u32(mut reader: impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

// false on a clean end-of-file before the first byte of a record
fn read_record_start(mut reader: impl Read, buf: &mut [u8; 4]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
