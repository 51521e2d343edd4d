use std::marker::PhantomData;

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::BuildConfig;
use crate::encoding::HexDigest;
use crate::error::{Error, Result};
use crate::hash::Algorithm;
use crate::proof::{Proof, Side};

/// Merkle Tree.
///
/// Leafs and nodes are stored layer by layer, each layer in its own vec.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///         root = h1234 = h(h12 + h34)
///        /                           \
///  h12 = h(h1 + h2)            h34 = h(h3 + h4)
///   /            \              /            \
/// h1 = h(tx1)  h2 = h(tx2)    h3 = h(tx3)  h4 = h(tx4)
/// ```
///
/// In memory layout:
///
/// ```text
///     [[h1 h2 h3 h4] [h12 h34] [root]]
/// ```
///
/// Merkle root is always the only element of the last layer.
///
/// The number of inputs is not always a power of two. When a layer has an odd
/// number of nodes the last one has no sibling and is carried up to the next
/// layer as is, without hashing:
///
/// ```text
///        root = h(h12 + h3)
///        /               \
///  h12 = h(h1 + h2)       h3
///   /            \         |
///  h1            h2        h3
/// ```
///
/// It is not duplicated and hashed with itself, so roots differ from trees
/// using that convention.
///
/// The tree is immutable once built; building from new data gives a new tree.
#[derive(Debug, Clone)]
pub struct MerkleTree<T, A>
where
    T: Element,
    A: Algorithm<T>,
{
    layers: Vec<Vec<T>>,
    leafs: usize,
    _a: PhantomData<A>,
}

/// Element stored in the merkle tree.
pub trait Element: Eq + Clone + AsRef<[u8]> + Sync + Send + std::fmt::Debug {
    /// Returns the length of an element when serialized as a byte slice.
    fn byte_len() -> usize;

    /// Creates the element from its byte form.
    fn from_slice(bytes: &[u8]) -> Result<Self>;
}

impl<T: Element, A: Algorithm<T>> MerkleTree<T, A> {
    /// Creates new merkle tree from a list of opaque data items.
    pub fn from_data<D, I>(data: I) -> Result<MerkleTree<T, A>>
    where
        D: AsRef<[u8]> + Sync,
        I: IntoIterator<Item = D>,
    {
        Self::from_data_with_config(data, BuildConfig::default())
    }

    /// Creates new merkle tree from a list of opaque data items.
    pub fn from_data_with_config<D, I>(data: I, config: BuildConfig) -> Result<MerkleTree<T, A>>
    where
        D: AsRef<[u8]> + Sync,
        I: IntoIterator<Item = D>,
    {
        let items: Vec<D> = data.into_iter().collect();
        let leafs = if config.is_parallel(items.len()) {
            items
                .par_iter()
                .map(|item| A::default().leaf(item.as_ref()))
                .collect::<Result<Vec<T>>>()?
        } else {
            let mut a = A::default();
            items
                .iter()
                .map(|item| a.leaf(item.as_ref()))
                .collect::<Result<Vec<T>>>()?
        };

        Self::build(leafs, config)
    }

    /// Creates new merkle tree from a sequence of leaf hashes.
    pub fn from_leafs(leafs: Vec<T>) -> Result<MerkleTree<T, A>> {
        Self::build(leafs, BuildConfig::default())
    }

    /// Creates new merkle tree from a sequence of leaf hashes.
    pub fn from_leafs_with_config(leafs: Vec<T>, config: BuildConfig) -> Result<MerkleTree<T, A>> {
        Self::build(leafs, config)
    }

    /// Creates new merkle tree from a fallible stream of leaf hashes, stopping
    /// at the first error.
    pub fn try_from_iter<I: IntoIterator<Item = Result<T>>>(into: I) -> Result<MerkleTree<T, A>> {
        let leafs = into.into_iter().collect::<Result<Vec<T>>>()?;
        Self::build(leafs, BuildConfig::default())
    }

    fn build(leafs: Vec<T>, config: BuildConfig) -> Result<Self> {
        let count = leafs.len();
        let mut layers: Vec<Vec<T>> = Vec::with_capacity(get_merkle_tree_height(count));
        if count > 0 {
            layers.push(leafs);
        }

        // Process one level at a time. Each level has half the nodes of the
        // previous one, rounded up for the carried odd node.
        loop {
            let next = match layers.last() {
                Some(layer) if layer.len() > 1 => next_layer::<T, A>(layer, &config)?,
                _ => break,
            };
            trace!("built layer {} of width {}", layers.len(), next.len());
            layers.push(next);
        }

        debug_assert_eq!(layers.len(), get_merkle_tree_height(count));

        let tree = MerkleTree {
            layers,
            leafs: count,
            _a: PhantomData,
        };

        match tree.root() {
            Some(root) => debug!(
                "built merkle tree: leafs {}, height {}, root {}",
                tree.leafs,
                tree.height(),
                HexDigest::new(&root)
            ),
            None => debug!("built empty merkle tree"),
        }

        Ok(tree)
    }

    /// Generate merkle tree inclusion proof for leaf `i`
    pub fn gen_proof(&self, i: usize) -> Result<Proof<T>> {
        // i in [0 .. self.leafs)
        if i >= self.leafs {
            return Err(Error::IndexOutOfRange {
                index: i,
                leafs: self.leafs,
            });
        }

        let mut lemma: Vec<T> = Vec::with_capacity(self.height());
        let mut path: Vec<Side> = Vec::with_capacity(self.height());

        let mut j = i;
        if let Some((_root, layers)) = self.layers.split_last() {
            for layer in layers {
                let (sibling, side) = if j & 1 == 0 {
                    // j is left
                    (j + 1, Side::Right)
                } else {
                    // j is right
                    (j - 1, Side::Left)
                };

                // No sibling: j is carried up as is, nothing to record.
                if let Some(node) = layer.get(sibling) {
                    lemma.push(node.clone());
                    path.push(side);
                }

                j >>= 1;
            }
        }

        debug!(
            "generated proof for leaf {} of {}: {} steps",
            i,
            self.leafs,
            lemma.len()
        );

        Proof::new(lemma, path, self.leafs)
    }

    /// Returns merkle root, `None` for a tree built from no data.
    #[inline]
    pub fn root(&self) -> Option<T> {
        self.layers.last().and_then(|layer| layer.first()).cloned()
    }

    /// Returns leaf hash `i`.
    pub fn leaf(&self, i: usize) -> Result<T> {
        self.layers
            .first()
            .and_then(|leafs| leafs.get(i))
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index: i,
                leafs: self.leafs,
            })
    }

    /// Returns the nodes of layer `level`, leafs being level 0.
    #[inline]
    pub fn layer(&self, level: usize) -> Option<&[T]> {
        self.layers.get(level).map(Vec::as_slice)
    }

    /// Iterates over layers from the leafs up to the root.
    pub fn layers(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.layers.iter().map(Vec::as_slice)
    }

    /// Returns number of elements in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the tree was built from no data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leafs == 0
    }

    /// Returns height of the tree
    #[inline]
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    /// Returns original number of elements the tree was built upon.
    #[inline]
    pub fn leafs(&self) -> usize {
        self.leafs
    }
}

impl<T: Element, A: Algorithm<T>> PartialEq for MerkleTree<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.leafs == other.leafs && self.layers == other.layers
    }
}

impl<T: Element, A: Algorithm<T>> Eq for MerkleTree<T, A> {}

fn next_layer<T: Element, A: Algorithm<T>>(layer: &[T], config: &BuildConfig) -> Result<Vec<T>> {
    if config.is_parallel(layer.len()) {
        layer
            .par_chunks(2)
            .map(|pair| combine(&mut A::default(), pair))
            .collect()
    } else {
        let mut a = A::default();
        layer.chunks(2).map(|pair| combine(&mut a, pair)).collect()
    }
}

#[inline]
fn combine<T: Element, A: Algorithm<T>>(a: &mut A, pair: &[T]) -> Result<T> {
    match pair {
        [left, right] => a.node(left, right),
        // odd trailing node goes up unchanged
        _ => Ok(pair[0].clone()),
    }
}

impl Element for [u8; 32] {
    fn byte_len() -> usize {
        32
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidDigestLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut el = [0u8; 32];
        el.copy_from_slice(bytes);
        Ok(el)
    }
}

/// Width of the layer above a layer of `width` nodes.
#[inline]
pub fn next_layer_width(width: usize) -> usize {
    width / 2 + (width & 1)
}

/// Number of layers of a tree built over `leafs` items, 0 for none.
pub fn get_merkle_tree_height(leafs: usize) -> usize {
    if leafs == 0 {
        return 0;
    }

    let mut height = 1;
    let mut width = leafs;
    while width > 1 {
        width = next_layer_width(width);
        height += 1;
    }
    height
}

/// Total number of nodes over all layers of a tree built over `leafs` items.
pub fn get_merkle_tree_len(leafs: usize) -> usize {
    if leafs == 0 {
        return 0;
    }

    let mut len = leafs;
    let mut width = leafs;
    while width > 1 {
        width = next_layer_width(width);
        len += width;
    }
    len
}
