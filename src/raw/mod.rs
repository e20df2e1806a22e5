mod arena;
mod handle;
mod node;
mod raw_avl;

pub(crate) use raw_avl::{Iter, RawAvlTree};
