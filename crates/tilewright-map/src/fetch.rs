use tilewright_geom::{Band, Position};

use crate::leaf::{Leaf, LeafKey};
use crate::tile::Tile;

/// Ask for the content of one leaf on one band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LeafRequest {
    pub key: LeafKey,
    pub band: Band,
}

/// Content answering a `LeafRequest`. Tiles outside the leaf or band are
/// dropped on receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafDelivery {
    pub key: LeafKey,
    pub band: Band,
    pub tiles: Vec<(Position, Tile)>,
}

/// The source of remote leaf content. Local maps are never live.
pub trait LeafFetcher {
    fn is_live(&self) -> bool;
    /// Fire and forget; the answer comes back as a `LeafDelivery`.
    fn request_leaf(&mut self, request: LeafRequest);
}

/// Fetcher for maps that are fully local.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl LeafFetcher for Offline {
    fn is_live(&self) -> bool {
        false
    }

    fn request_leaf(&mut self, _request: LeafRequest) {}
}

/// What a consumer may do with a leaf slot right now.
#[derive(Debug)]
pub enum BlockView<'a> {
    /// Content is present and may be drawn.
    Ready(&'a Leaf),
    /// Content has been requested (now or earlier) and has not arrived.
    Pending,
    /// No leaf here on a local map.
    Absent,
}

impl BlockView<'_> {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, BlockView::Ready(_))
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, BlockView::Pending)
    }
}
