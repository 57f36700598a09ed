//! Example that dumps every table of an OMF module.

use clap::{Arg, ArgAction, Command};
use omf_read::OmfObject;
use std::path::PathBuf;
use std::{fs, process};

fn main() {
    let matches = Command::new("omfdump")
        .arg(
            Arg::new("file")
                .action(ArgAction::Append)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("The file to read"),
        )
        .arg(
            Arg::new("names")
                .long("names")
                .action(ArgAction::SetTrue)
                .help("Print the name list"),
        )
        .arg(
            Arg::new("sections")
                .long("sections")
                .action(ArgAction::SetTrue)
                .help("Print the sections"),
        )
        .arg(
            Arg::new("symbols")
                .long("symbols")
                .action(ArgAction::SetTrue)
                .help("Print the symbols"),
        )
        .get_matches();
    let mut all = true;
    let print_names = matches.get_flag("names");
    let print_sections = matches.get_flag("sections");
    let print_symbols = matches.get_flag("symbols");
    if print_names || print_sections || print_symbols {
        all = false;
    }

    for file_path in matches.get_many::<PathBuf>("file").unwrap() {
        let file = match fs::File::open(file_path) {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Failed to open file '{}': {}", file_path.display(), err);
                process::exit(1);
            }
        };
        let file = match unsafe { memmap2::Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(err) => {
                eprintln!("Failed to map file '{}': {}", file_path.display(), err);
                process::exit(1);
            }
        };
        let object = match OmfObject::parse(&file) {
            Ok(object) => object,
            Err(err) => {
                eprintln!("Failed to parse file '{}': {}", file_path.display(), err);
                process::exit(1);
            }
        };

        println!("{}: {}-bit", file_path.display(), object.address_width());
        if let Some((vaddr, paddr)) = object.entry_point() {
            println!("entry: vaddr 0x{:x} paddr 0x{:x}", vaddr, paddr);
        }
        if all || print_names {
            print_name_list(&object);
        }
        if all || print_sections {
            print_sections_table(&object);
        }
        if all || print_symbols {
            print_symbol_table(&object);
        }
    }
}

fn print_name_list(object: &OmfObject) {
    println!("Names:");
    for (index, name) in object.names().iter().enumerate() {
        match name {
            Some(name) => println!("{:4}: {}", index + 1, name),
            None => println!("{:4}: <none>", index + 1),
        }
    }
}

fn print_sections_table(object: &OmfObject) {
    println!("Sections:");
    for descriptor in object.export_all_sections() {
        println!(
            "{:<16} vaddr 0x{:08x} paddr 0x{:08x} size 0x{:x}",
            descriptor.name, descriptor.vaddr, descriptor.paddr, descriptor.size,
        );
    }
}

fn print_symbol_table(object: &OmfObject) {
    println!("Symbols:");
    for symbol in object.symbols() {
        println!(
            "0x{:08x} 0x{:08x} {}",
            object.symbol_vaddr(symbol),
            object.symbol_paddr(symbol),
            symbol.name,
        );
    }
}
