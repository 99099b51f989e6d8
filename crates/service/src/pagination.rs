//! Offset windows over key-ordered store listings.

/// Largest window a single `list_page` call may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One `offset`/`limit` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

/// Windows covering `total` rows, `size` at a time. `size` is clamped to
/// `1..=MAX_PAGE_SIZE`; the last window may extend past `total`.
pub fn pages(total: u64, size: u32) -> impl Iterator<Item = Page> {
    let limit = size.clamp(1, MAX_PAGE_SIZE) as u64;
    (0..total.div_ceil(limit)).map(move |i| Page { offset: i * limit, limit })
}
