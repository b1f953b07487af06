//! Octree and hextree palette builders
//!
//! Both strategies share one color tree, generic over the number of channels
//! that select a child: three (RGB, 8 children) for the octree and four (RGBA,
//! 16 children) for the hextree. Each level consumes one bit of every channel,
//! most significant first, so a node at depth 8 is an exact color.
//!
//! Colors are inserted from a sorted histogram, which keeps the resulting
//! palette independent of hash iteration order. Whenever the number of leaves
//! exceeds the budget the deepest reducible node folds its children into
//! itself. Freed nodes are recycled, so the arena stays proportional to the
//! palette size rather than to the number of distinct colors.
//!
//! The octree only sees opaque colors. Fully transparent pixels reserve a
//! single `[0, 0, 0, 0]` entry at index 0. The hextree quantizes alpha along
//! with color and orders translucent entries first to keep `tRNS` short.

use ahash::AHashMap;
use blend_core::utils::unpack_argb;
use blend_core::{Palette, QuantizeMode};

use super::PaletteBuilder;
use crate::canvas::Canvas;

const MAX_DEPTH: usize = 8;
const MAX_CHILDREN: usize = 16;
const NO_NODE: u32 = 0;

/// Palette builder for both tree strategies
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeQuantizer;

impl PaletteBuilder for TreeQuantizer {
    fn build_palette(&self, canvas: &Canvas, max_colors: usize, strategy: QuantizeMode) -> Palette {
        let max_colors = max_colors.clamp(1, Palette::MAX_COLORS);
        let histogram = histogram(canvas.pixels());
        let colors = match strategy {
            QuantizeMode::Octree => octree_colors(&histogram, max_colors),
            QuantizeMode::Hextree => hextree_colors(&histogram, max_colors),
        };
        Palette::new(colors)
    }
}

/// Distinct pixels with their counts, sorted by pixel value
///
/// Every fully transparent pixel collapses to `0`.
fn histogram(pixels: &[u32]) -> Vec<(u32, u64)> {
    let mut counts: AHashMap<u32, u64> = AHashMap::new();
    for &pixel in pixels {
        let key = if pixel >> 24 == 0 { 0 } else { pixel };
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut histogram: Vec<_> = counts.into_iter().collect();
    histogram.sort_unstable_by_key(|&(pixel, _)| pixel);
    histogram
}

fn octree_colors(histogram: &[(u32, u64)], max_colors: usize) -> Vec<[u8; 4]> {
    let transparent = histogram.iter().any(|&(pixel, _)| pixel >> 24 == 0);
    let budget = max_colors - usize::from(transparent);

    let mut colors = Vec::with_capacity(max_colors);
    if transparent {
        colors.push([0, 0, 0, 0]);
    }
    if budget > 0 {
        let mut tree = ColorTree::<3>::new(budget);
        for &(pixel, count) in histogram.iter().filter(|&&(pixel, _)| pixel >> 24 != 0) {
            let [r, g, b, _] = unpack_argb(pixel);
            tree.insert([r, g, b], count);
        }
        colors.extend(tree.colors().into_iter().map(|[r, g, b]| [r, g, b, 0xFF]));
    }
    if colors.is_empty() {
        colors.push([0, 0, 0, 0xFF]);
    }
    colors
}

fn hextree_colors(histogram: &[(u32, u64)], max_colors: usize) -> Vec<[u8; 4]> {
    let mut tree = ColorTree::<4>::new(max_colors);
    for &(pixel, count) in histogram {
        tree.insert(unpack_argb(pixel), count);
    }
    let mut colors = tree.colors();
    colors.sort_by_key(|color| color[3] == 0xFF);
    if colors.is_empty() {
        colors.push([0, 0, 0, 0xFF]);
    }
    colors
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: [u32; MAX_CHILDREN],
    sums: [u64; 4],
    count: u64,
    leaf: bool,
}

impl Node {
    fn average<const CHANNELS: usize>(&self) -> [u8; CHANNELS] {
        let half = self.count / 2;
        std::array::from_fn(|c| ((self.sums[c] + half) / self.count) as u8)
    }
}

struct ColorTree<const CHANNELS: usize> {
    nodes: Vec<Node>,
    free: Vec<u32>,
    reducible: [Vec<u32>; MAX_DEPTH],
    leaves: usize,
    max_leaves: usize,
}

impl<const CHANNELS: usize> ColorTree<CHANNELS> {
    fn new(max_leaves: usize) -> Self {
        let mut reducible: [Vec<u32>; MAX_DEPTH] = Default::default();
        reducible[0].push(0);
        Self {
            nodes: vec![Node::default()],
            free: Vec::new(),
            reducible,
            leaves: 0,
            max_leaves,
        }
    }

    fn child_slot(color: &[u8; CHANNELS], level: usize) -> usize {
        let shift = 7 - level;
        color
            .iter()
            .enumerate()
            .fold(0, |slot, (c, &v)| slot | (usize::from((v >> shift) & 1) << c))
    }

    fn alloc(&mut self, leaf: bool) -> u32 {
        let node = Node {
            leaf,
            ..Node::default()
        };
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = node;
            index
        } else {
            self.nodes.push(node);
            (self.nodes.len() - 1) as u32
        }
    }

    fn insert(&mut self, color: [u8; CHANNELS], weight: u64) {
        let mut node = 0;
        for level in 0..MAX_DEPTH {
            if self.nodes[node].leaf {
                break;
            }
            let slot = Self::child_slot(&color, level);
            let mut child = self.nodes[node].children[slot];
            if child == NO_NODE {
                let leaf = level + 1 == MAX_DEPTH;
                child = self.alloc(leaf);
                self.nodes[node].children[slot] = child;
                if leaf {
                    self.leaves += 1;
                } else {
                    self.reducible[level + 1].push(child);
                }
            }
            node = child as usize;
        }

        let target = &mut self.nodes[node];
        for (sum, &value) in target.sums.iter_mut().zip(color.iter()) {
            *sum += u64::from(value) * weight;
        }
        target.count += weight;

        while self.leaves > self.max_leaves && self.reduce() {}
    }

    /// Fold the children of the deepest reducible node into it
    fn reduce(&mut self) -> bool {
        let Some(level) = (0..MAX_DEPTH).rev().find(|&l| !self.reducible[l].is_empty()) else {
            return false;
        };
        let Some(index) = self.reducible[level].pop() else {
            return false;
        };
        let index = index as usize;

        let children = std::mem::take(&mut self.nodes[index].children);
        let mut merged = 0;
        for child in children.into_iter().filter(|&c| c != NO_NODE) {
            let Node { sums, count, .. } = self.nodes[child as usize];
            let parent = &mut self.nodes[index];
            for (total, part) in parent.sums.iter_mut().zip(sums) {
                *total += part;
            }
            parent.count += count;
            self.free.push(child);
            merged += 1;
        }
        self.nodes[index].leaf = true;
        self.leaves = self.leaves + 1 - merged;
        true
    }

    /// Leaf averages in depth-first order
    fn colors(&self) -> Vec<[u8; CHANNELS]> {
        let mut colors = Vec::new();
        let mut stack = vec![0u32];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.leaf {
                if node.count > 0 {
                    colors.push(node.average());
                }
                continue;
            }
            stack.extend(node.children.iter().rev().copied().filter(|&c| c != NO_NODE));
        }
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_core::utils::pack_argb;
    use pretty_assertions::assert_eq;

    fn canvas(pixels: Vec<u32>) -> Canvas {
        let width = pixels.len() as u32;
        Canvas::from_pixels(width, 1, pixels).unwrap()
    }

    fn sorted(palette: &Palette) -> Vec<[u8; 4]> {
        let mut colors = palette.colors().to_vec();
        colors.sort_unstable();
        colors
    }

    #[test]
    fn few_colors_survive_exactly() {
        let canvas = canvas(vec![
            pack_argb(255, 0, 0, 255),
            pack_argb(0, 255, 0, 255),
            pack_argb(0, 0, 255, 255),
            pack_argb(255, 0, 0, 255),
        ]);
        for mode in [QuantizeMode::Octree, QuantizeMode::Hextree] {
            let palette = TreeQuantizer.build_palette(&canvas, 16, mode);
            assert_eq!(
                sorted(&palette),
                vec![[0, 0, 255, 255], [0, 255, 0, 255], [255, 0, 0, 255]]
            );
        }
    }

    #[test]
    fn palette_respects_budget() {
        let pixels = (0..4096u32)
            .map(|i| pack_argb((i * 7) as u8, (i * 13 >> 4) as u8, (i >> 4) as u8, 255))
            .collect();
        let canvas = canvas(pixels);
        for max in [2, 16, 64, 256] {
            for mode in [QuantizeMode::Octree, QuantizeMode::Hextree] {
                let palette = TreeQuantizer.build_palette(&canvas, max, mode);
                assert!(!palette.is_empty());
                assert!(palette.len() <= max, "{mode:?} gave {} > {max}", palette.len());
            }
        }
    }

    #[test]
    fn octree_reserves_transparent_entry() {
        let canvas = canvas(vec![0x00FF_FFFF, pack_argb(10, 20, 30, 255), pack_argb(10, 20, 30, 40)]);
        let palette = TreeQuantizer.build_palette(&canvas, 4, QuantizeMode::Octree);
        assert_eq!(palette.colors()[0], [0, 0, 0, 0]);
        assert!(palette.colors()[1..].iter().all(|c| c[3] == 255));
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn octree_with_single_color_budget_keeps_only_transparency() {
        let canvas = canvas(vec![0, pack_argb(1, 2, 3, 255)]);
        let palette = TreeQuantizer.build_palette(&canvas, 1, QuantizeMode::Octree);
        assert_eq!(palette.colors(), &[[0, 0, 0, 0]]);
    }

    #[test]
    fn hextree_keeps_partial_alpha_first() {
        let canvas = canvas(vec![pack_argb(200, 0, 0, 255), pack_argb(0, 0, 200, 128)]);
        let palette = TreeQuantizer.build_palette(&canvas, 8, QuantizeMode::Hextree);
        assert_eq!(palette.colors(), &[[0, 0, 200, 128], [200, 0, 0, 255]]);
        assert_eq!(palette.to_trns(), Some(vec![128]));
    }

    #[test]
    fn reduction_averages_by_weight() {
        let mut tree = ColorTree::<3>::new(1);
        tree.insert([0, 0, 0], 3);
        tree.insert([100, 100, 100], 1);
        assert_eq!(tree.colors(), vec![[25, 25, 25]]);
    }

    #[test]
    fn freed_nodes_are_reused() {
        let mut tree = ColorTree::<3>::new(4);
        for v in 0..=255u8 {
            tree.insert([v, v, v], 1);
        }
        assert!(tree.leaves <= 4);
        assert!(tree.nodes.len() < 256);
    }
}
