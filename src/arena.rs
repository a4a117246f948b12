use core::mem;
use core::ptr::NonNull;

use crate::align::padding_for;
use crate::block::{HEADER_SIZE, Header, MAX_BLOCK_SIZE};

/// Largest payload alignment the typed API supports.
///
/// The arena buffer itself is aligned to this value, so alignment can
/// be computed from byte offsets alone.
pub const MAX_ALIGN: usize = 16;

#[repr(C, align(16))]
struct Arena<const SIZE: usize>([u8; SIZE]);

/// Fixed-capacity first-fit allocator over an inline `SIZE`-byte arena.
///
/// The arena is carved into blocks, each a 4 byte [`Header`] followed
/// by its payload. Headers tile the buffer with no gaps: the next
/// block always starts `HEADER_SIZE + size` bytes after the current
/// one, so no separate free list is kept. Allocation is a linear
/// first-fit scan that splits the chosen block; releasing a block
/// merges it with any free neighbour, so no two adjacent blocks are
/// ever both free.
///
/// All operations are `O(n)` in the number of live blocks and never
/// touch memory outside the arena. The allocator is single-threaded:
/// share it across threads only behind external synchronization.
pub struct BlockAllocator<const SIZE: usize> {
  arena: Arena<SIZE>,
}

impl<const SIZE: usize> BlockAllocator<SIZE> {
  /// Creates an allocator whose arena is one free block spanning the
  /// whole buffer.
  ///
  /// `SIZE` must be large enough to hold at least a header and is
  /// capped at 2^31 bytes by the header's 31-bit size field; both
  /// bounds are enforced at compile time.
  pub fn new() -> Self {
    const {
      assert!(SIZE > HEADER_SIZE, "arena too small to hold a block header");
      assert!(SIZE < 1 << 31, "arena larger than a header can address");
    }

    let mut allocator = Self {
      arena: Arena([0u8; SIZE]),
    };
    allocator.write_header(0, Header::new(true, (SIZE - HEADER_SIZE) as u32));
    allocator
  }

  /// Reserves `size` payload bytes and returns a pointer to them, or
  /// `None` when no free block is large enough.
  ///
  /// The scan picks the lowest-offset free block whose payload fits
  /// `size` exactly as requested; sizes are never rounded, so the
  /// returned region has no alignment guarantee beyond byte access.
  /// `size == 0` is permitted and yields a valid pointer with zero
  /// usable bytes.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let payload = self.reserve(size, 1)?;
    NonNull::new(self.arena.0.as_mut_ptr().wrapping_add(payload))
  }

  /// Returns a region obtained from [`allocate`](Self::allocate) to
  /// the arena and merges it with any adjacent free block.
  ///
  /// Null pointers and pointers outside the arena are ignored; the
  /// arena is left untouched. Note this also masks genuine misuse: a
  /// foreign pointer is indistinguishable from a no-op. A pointer
  /// *inside* the arena that was never returned by `allocate` corrupts
  /// the block chain (no memory unsafety follows, every chain offset
  /// is bounds-checked, but subsequent allocations may overlap).
  pub fn deallocate(
    &mut self,
    ptr: *mut u8,
  ) {
    if ptr.is_null() {
      return;
    }
    let Some(payload) = self.offset_of(ptr) else {
      return;
    };
    if payload < HEADER_SIZE {
      return;
    }
    self.release(payload - HEADER_SIZE);
  }

  /// Moves `value` into an arena-backed region and returns a pointer
  /// to it, or `None` when no free block fits (the value is dropped in
  /// that case).
  ///
  /// The region is aligned for `T`; types aligned above [`MAX_ALIGN`]
  /// fail the allocation. A `T` larger than the arena itself is
  /// rejected at compile time.
  ///
  /// The arena owns the backing bytes until [`destroy`](Self::destroy)
  /// is called; dropping the allocator invalidates the pointer without
  /// running `T`'s destructor.
  pub fn construct<T>(
    &mut self,
    value: T,
  ) -> Option<NonNull<T>> {
    const {
      assert!(
        mem::size_of::<T>() < SIZE - HEADER_SIZE,
        "type is larger than the arena"
      );
    }

    let payload = self.reserve(mem::size_of::<T>(), mem::align_of::<T>())?;
    let ptr = self.arena.0.as_mut_ptr().wrapping_add(payload).cast::<T>();
    // reserve aligned the payload start for T
    unsafe { ptr.write(value) };
    NonNull::new(ptr)
  }

  /// Runs `T`'s destructor in place, then returns the backing bytes to
  /// the arena. Null pointers are a no-op.
  ///
  /// WARNING: for a non-null pointer that was not obtained from this
  /// allocator the destructor still runs, but no memory is reclaimed
  /// (the engine cannot tell the pointer is foreign until after the
  /// drop). This mirrors the raw path's silent no-op on foreign
  /// pointers.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or point to a live `T` that has not been
  /// destroyed since it was constructed.
  pub unsafe fn destroy<T>(
    &mut self,
    ptr: *mut T,
  ) {
    if ptr.is_null() {
      return;
    }
    unsafe { ptr.drop_in_place() };
    if let Some(offset) = self.owning_block(ptr.cast::<u8>().cast_const()) {
      self.release(offset);
    }
  }

  /// Total arena capacity in bytes, header overhead included.
  pub const fn capacity(&self) -> usize {
    SIZE
  }

  /// Iterates the block chain in address order, yielding each block's
  /// byte offset and decoded header.
  pub fn blocks(&self) -> Blocks<'_, SIZE> {
    Blocks {
      allocator: self,
      offset: 0,
    }
  }

  /// Number of blocks currently in the chain.
  pub fn block_count(&self) -> usize {
    self.blocks().count()
  }

  /// Payload bytes currently free, summed over all free blocks. Not
  /// all of it is reachable by a single allocation; see
  /// [`largest_free_block`](Self::largest_free_block).
  pub fn free_bytes(&self) -> usize {
    self
      .blocks()
      .filter(|(_, header)| header.free)
      .map(|(_, header)| header.size as usize)
      .sum()
  }

  /// Payload bytes currently handed out.
  pub fn used_bytes(&self) -> usize {
    self
      .blocks()
      .filter(|(_, header)| !header.free)
      .map(|(_, header)| header.size as usize)
      .sum()
  }

  /// Largest single allocation that can currently succeed.
  pub fn largest_free_block(&self) -> usize {
    self
      .blocks()
      .filter(|(_, header)| header.free)
      .map(|(_, header)| header.size as usize)
      .max()
      .unwrap_or(0)
  }

  /// First-fit scan plus split. Returns the byte offset of the
  /// reserved payload (past any alignment padding), or `None` when no
  /// free block fits.
  fn reserve(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<usize> {
    if size > MAX_BLOCK_SIZE || align > MAX_ALIGN || !align.is_power_of_two() {
      return None;
    }

    let (offset, padding) = self.find_fit(size, align)?;
    let old_size = self.read_header(offset).size as usize;
    let requested = size + padding;

    if old_size - requested <= 2 * HEADER_SIZE {
      // The leftover cannot host a free block with a usable payload;
      // absorb it instead of creating a zero-size neighbour.
      self.write_header(offset, Header::new(false, old_size as u32));
    } else {
      let remainder = old_size - requested - HEADER_SIZE;
      self.write_header(offset, Header::new(false, requested as u32));
      let next = offset + HEADER_SIZE + requested;
      self.write_header(next, Header::new(true, remainder as u32));
    }

    Some(offset + HEADER_SIZE + padding)
  }

  /// Walks the chain for the first free block that fits `size` plus
  /// the padding its payload start needs for `align`. Returns the
  /// block's offset and that padding.
  fn find_fit(
    &self,
    size: usize,
    align: usize,
  ) -> Option<(usize, usize)> {
    let mut offset = 0;

    while offset + HEADER_SIZE <= SIZE {
      let header = self.read_header(offset);
      if header.free {
        let padding = padding_for(offset + HEADER_SIZE, align);
        if header.size as usize >= size + padding {
          return Some((offset, padding));
        }
      }
      offset = Self::next_offset(offset, header);
    }

    None
  }

  /// Marks the block starting at `header_offset` free and merges it
  /// with free neighbours.
  fn release(
    &mut self,
    header_offset: usize,
  ) {
    let mut header = self.read_header(header_offset);
    header.free = true;
    self.write_header(header_offset, header);
    self.coalesce(header_offset);
  }

  /// Merges the block at `offset` with its neighbours: next first, so
  /// a free previous block absorbs the already-extended size.
  fn coalesce(
    &mut self,
    offset: usize,
  ) {
    let mut header = self.read_header(offset);

    let next = Self::next_offset(offset, header);
    if next + HEADER_SIZE <= SIZE {
      let next_header = self.read_header(next);
      if next_header.free {
        // The absorbed header is now covered by this payload and the
        // chain walk will never land on it again.
        header.size += next_header.size + HEADER_SIZE as u32;
        self.write_header(offset, header);
      }
    }

    if let Some(previous) = self.previous_offset(offset) {
      let mut previous_header = self.read_header(previous);
      if previous_header.free {
        previous_header.size += header.size + HEADER_SIZE as u32;
        self.write_header(previous, previous_header);
      }
    }
  }

  /// Finds the block immediately before `offset` by walking forward
  /// from the arena start. No back-pointers are stored, so releasing
  /// is `O(n)` like allocating.
  fn previous_offset(
    &self,
    offset: usize,
  ) -> Option<usize> {
    if offset == 0 {
      return None;
    }

    let mut current = 0;
    while current + HEADER_SIZE <= SIZE {
      let next = Self::next_offset(current, self.read_header(current));
      if next >= offset {
        return Some(current);
      }
      current = next;
    }

    None
  }

  /// Finds the block whose payload contains `ptr` by walking the
  /// chain. Typed allocations may start past their block's payload
  /// start when alignment padding was absorbed, so recovery cannot
  /// assume the header sits immediately before the pointer.
  fn owning_block(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let target = self.offset_of(ptr)?;

    let mut offset = 0;
    while offset + HEADER_SIZE <= SIZE {
      let header = self.read_header(offset);
      let payload = offset + HEADER_SIZE;
      let end = payload + header.size as usize;
      if target >= payload && target <= end {
        return Some(offset);
      }
      if target < payload {
        return None;
      }
      offset = end;
    }

    None
  }

  /// Byte offset of `ptr` inside the arena, or `None` for foreign
  /// pointers. The one-past-the-end address is in range: it is a valid
  /// payload address for a zero-size block at the very end.
  fn offset_of(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let base = self.arena.0.as_ptr() as usize;
    let addr = ptr as usize;
    if addr < base || addr > base + SIZE {
      return None;
    }
    Some(addr - base)
  }

  fn next_offset(
    offset: usize,
    header: Header,
  ) -> usize {
    offset + HEADER_SIZE + header.size as usize
  }

  fn read_header(
    &self,
    offset: usize,
  ) -> Header {
    debug_assert!(offset + HEADER_SIZE <= SIZE);
    let mut bytes = [0u8; HEADER_SIZE];
    bytes.copy_from_slice(&self.arena.0[offset..offset + HEADER_SIZE]);
    Header::decode(bytes)
  }

  fn write_header(
    &mut self,
    offset: usize,
    header: Header,
  ) {
    debug_assert!(offset + HEADER_SIZE <= SIZE);
    self.arena.0[offset..offset + HEADER_SIZE].copy_from_slice(&header.encode());
  }
}

/// Iterator over the arena's block chain in address order.
pub struct Blocks<'a, const SIZE: usize> {
  allocator: &'a BlockAllocator<SIZE>,
  offset: usize,
}

impl<const SIZE: usize> Iterator for Blocks<'_, SIZE> {
  type Item = (usize, Header);

  fn next(&mut self) -> Option<Self::Item> {
    if self.offset + HEADER_SIZE > SIZE {
      return None;
    }
    let header = self.allocator.read_header(self.offset);
    let item = (self.offset, header);
    self.offset = BlockAllocator::<SIZE>::next_offset(self.offset, header);
    Some(item)
  }
}
