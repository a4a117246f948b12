use std::fs;
use std::ptr;

use blockalloc::{BlockAllocator, VERSION};

/// A level record, stand-in for the kind of value a game would place
/// in a pre-sized arena.
struct LevelData {
  name: String,
  contents: *mut u8,
  size: usize,
}

impl LevelData {
  fn new(name: &str) -> Self {
    println!("Creating level data...");
    Self {
      name: name.to_owned(),
      contents: ptr::null_mut(),
      size: 0,
    }
  }
}

impl Drop for LevelData {
  fn drop(&mut self) {
    println!("Destroying level data...");
  }
}

/// Dumps the block chain, one line per block.
fn print_status<const SIZE: usize>(alloc: &BlockAllocator<SIZE>) {
  println!(
    "arena: {} bytes in {} block(s), {} used, {} free (largest free block: {})",
    alloc.capacity(),
    alloc.block_count(),
    alloc.used_bytes(),
    alloc.free_bytes(),
    alloc.largest_free_block(),
  );
  for (offset, header) in alloc.blocks() {
    println!(
      "  offset {:>5}  {}  {:>5} bytes",
      offset,
      if header.free { "free" } else { "used" },
      header.size,
    );
  }
}

fn main() {
  let mut alloc = BlockAllocator::<8192>::new();

  println!("blockalloc demo, version {VERSION}");
  print_status(&alloc);

  // Values are placed into the arena with construct. A None return
  // means the allocation failed; nothing is constructed in that case.
  let Some(level) = alloc.construct(LevelData::new("My Level")) else {
    eprintln!("arena exhausted");
    return;
  };

  // Read this demo's own source into a raw allocation, which runs no
  // constructor and hands back plain bytes.
  match fs::read("demos/demo.rs") {
    Ok(bytes) => match alloc.allocate(bytes.len()) {
      Some(buffer) => {
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), buffer.as_ptr(), bytes.len()) };
        let level = unsafe { &mut *level.as_ptr() };
        level.contents = buffer.as_ptr();
        level.size = bytes.len();
        println!(
          "Level file \"{}\" opened and read. Length: {}",
          level.name, level.size
        );
      }
      None => eprintln!("level file does not fit into the arena"),
    },
    Err(_) => eprintln!("Couldn't open level file."),
  }

  print_status(&alloc);

  // Raw regions go back with deallocate; no destructor runs. Null and
  // foreign pointers are accepted and ignored.
  let contents = unsafe { (*level.as_ptr()).contents };
  alloc.deallocate(contents);

  // destroy runs the destructor, then reclaims the memory.
  unsafe { alloc.destroy(level.as_ptr()) };

  print_status(&alloc);
}
