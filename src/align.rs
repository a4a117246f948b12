/// Calculates how many padding bytes bring `offset` up to `align`.
///
/// `align` must be a power of two. The arena buffer is aligned to
/// [`MAX_ALIGN`](crate::MAX_ALIGN), so offsets into it and real
/// addresses agree modulo any supported alignment.
pub(crate) fn padding_for(
  offset: usize,
  align: usize,
) -> usize {
  debug_assert!(align.is_power_of_two());
  offset.wrapping_neg() & (align - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_padding() {
    for align in [1usize, 2, 4, 8, 16] {
      for offset in 0..64usize {
        let padding = padding_for(offset, align);

        assert!(padding < align);
        assert_eq!((offset + padding) % align, 0);
      }
    }
  }

  #[test]
  fn aligned_offsets_need_no_padding() {
    for align in [1usize, 2, 4, 8, 16] {
      assert_eq!(padding_for(0, align), 0);
      assert_eq!(padding_for(align * 3, align), 0);
    }
  }
}
