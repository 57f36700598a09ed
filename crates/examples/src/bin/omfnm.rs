use omf_read::OmfObject;
use std::{env, fs, process};

fn main() {
    let mut args = env::args().skip(1);
    if args.len() < 1 {
        eprintln!("Usage: {} <object file path>", env::args().next().unwrap());
        process::exit(1);
    }

    let file_path = args.next().unwrap();

    let file = match fs::File::open(&file_path) {
        Ok(file) => file,
        Err(err) => {
            println!("Failed to open file '{}': {}", file_path, err,);
            return;
        }
    };
    let file = match unsafe { memmap2::Mmap::map(&file) } {
        Ok(mmap) => mmap,
        Err(err) => {
            println!("Failed to map file '{}': {}", file_path, err,);
            return;
        }
    };

    match OmfObject::parse(&file) {
        Ok(object) => print_symbols(&object),
        Err(err) => {
            println!("Failed to parse file '{}': {}", file_path, err,);
        }
    };
}

fn print_symbols(object: &OmfObject) {
    for symbol in object.symbols() {
        println!("0x{:08x} {}", object.symbol_vaddr(symbol), symbol.name);
    }
}
