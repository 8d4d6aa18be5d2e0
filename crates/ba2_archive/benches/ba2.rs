use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

/// A general archive with `count` zlib compressed entries of 64 KiB each
fn get_input(count: u32) -> Vec<u8> {
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    let payload = (0..65536u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&payload).unwrap();
    let packed = encoder.finish().unwrap();

    let names = (0..count)
        .map(|i| format!("Data\\Bench\\file{i:04}.bin"))
        .collect::<Vec<_>>();

    let data_start = 24 + 36 * count as u64;
    let name_table_offset = data_start + packed.len() as u64 * count as u64;

    let mut out = Vec::new();
    out.extend_from_slice(b"BTDX");
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(b"GNRL");
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&name_table_offset.to_le_bytes());

    for i in 0..count as u64 {
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(b"bin\0");
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&(data_start + i * packed.len() as u64).to_le_bytes());
        out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&0xBAADF00Du32.to_le_bytes());
    }
    for _ in 0..count {
        out.extend_from_slice(&packed);
    }
    for name in &names {
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }

    out
}

pub mod read {
    use ba2_archive::{Ba2Archive, ExtractOptions};
    use divan::Bencher;
    use std::io::Cursor;

    #[divan::bench(args = [16, 256])]
    fn open(bencher: Bencher, count: u32) {
        bencher
            .with_inputs(|| super::get_input(count))
            .bench_refs(|data| {
                divan::black_box(Ba2Archive::new(Cursor::new(data)).unwrap());
            });
    }

    #[divan::bench]
    fn lookup_name(bencher: Bencher) {
        let ba2 = Ba2Archive::new(Cursor::new(super::get_input(256))).unwrap();
        bencher.bench_local(|| {
            divan::black_box(ba2.index_for_name("Data\\Bench\\file0200.bin"));
        });
    }

    #[divan::bench(sample_count = 1)]
    fn read_entry_first(bencher: Bencher) {
        let mut ba2 = Ba2Archive::new(Cursor::new(super::get_input(16))).unwrap();
        let options = ExtractOptions::default();
        bencher.bench_local(move || {
            divan::black_box(ba2.read_entry(0, &options).unwrap());
        });
    }

    #[divan::bench(sample_count = 1)]
    fn read_entry_all(bencher: Bencher) {
        let mut ba2 = Ba2Archive::new(Cursor::new(super::get_input(16))).unwrap();
        let options = ExtractOptions::default();
        bencher.bench_local(move || {
            for i in 0..ba2.len() {
                divan::black_box(ba2.read_entry(i, &options).unwrap());
            }
        });
    }
}
