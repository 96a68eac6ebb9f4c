use glam::DVec2;
use petri_core::geometry::Rect;

/// Points a node holds before it subdivides.
pub const NODE_CAPACITY: usize = 4;
/// Nodes at this depth never subdivide; their bucket grows instead.
pub const MAX_DEPTH: usize = 12;

/// Region quadtree over a fixed boundary.
///
/// Stores copyable keys at points. Rebuilt from scratch every tick, so there
/// is no removal; call [`QuadTree::clear`] and re-insert.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: Node<T>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<T> {
    boundary: Rect,
    depth: usize,
    points: Vec<(DVec2, T)>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T: Copy> QuadTree<T> {
    /// An empty tree covering `boundary`.
    pub fn new(boundary: Rect) -> Self {
        Self {
            root: Node::new(boundary, 0),
            len: 0,
        }
    }

    /// The region this tree covers.
    pub fn boundary(&self) -> Rect {
        self.root.boundary
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `item` at `position`. Returns `false` if the position lies
    /// outside the boundary.
    pub fn insert(&mut self, position: DVec2, item: T) -> bool {
        let inserted = self.root.insert(position, item);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Every item whose position lies inside `range`, edges included.
    pub fn query(&self, range: &Rect) -> Vec<T> {
        let mut out = Vec::new();
        self.root.query(range, &mut out);
        out
    }

    /// Like [`QuadTree::query`] but appends into an existing buffer.
    pub fn query_into(&self, range: &Rect, out: &mut Vec<T>) {
        self.root.query(range, out);
    }

    /// Drop every point and collapse back to a single empty node.
    pub fn clear(&mut self) {
        self.root = Node::new(self.root.boundary, 0);
        self.len = 0;
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }
}

impl<T: Copy> Node<T> {
    fn new(boundary: Rect, depth: usize) -> Self {
        Self {
            boundary,
            depth,
            points: Vec::with_capacity(NODE_CAPACITY),
            children: None,
        }
    }

    fn insert(&mut self, position: DVec2, item: T) -> bool {
        if !self.boundary.contains(position) {
            return false;
        }
        if self.points.len() < NODE_CAPACITY || self.depth >= MAX_DEPTH {
            self.points.push((position, item));
            return true;
        }

        let depth = self.depth + 1;
        let boundary = self.boundary;
        let children = self
            .children
            .get_or_insert_with(|| Box::new(boundary.quadrants().map(|q| Node::new(q, depth))));
        for child in children.iter_mut() {
            if child.insert(position, item) {
                return true;
            }
        }
        // Rounding in the split can leave an edge point in no child.
        self.points.push((position, item));
        true
    }

    fn query(&self, range: &Rect, out: &mut Vec<T>) {
        if !self.boundary.intersects(range) {
            return;
        }
        out.extend(
            self.points
                .iter()
                .filter(|(p, _)| range.contains(*p))
                .map(|(_, item)| *item),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(range, out);
            }
        }
    }

    fn max_depth(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(Node::max_depth).max().unwrap_or(self.depth),
            None => self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> QuadTree<u32> {
        QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn insert_outside_boundary_is_rejected() {
        let mut tree = arena();
        assert!(!tree.insert(DVec2::new(-1.0, 50.0), 1));
        assert!(!tree.insert(DVec2::new(50.0, 100.5), 2));
        assert!(tree.is_empty());
    }

    #[test]
    fn edges_are_inclusive() {
        let mut tree = arena();
        assert!(tree.insert(DVec2::new(100.0, 100.0), 1));
        assert!(tree.insert(DVec2::new(0.0, 0.0), 2));
        let mut found = tree.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn point_on_dividing_line_is_found_after_split() {
        let mut tree = arena();
        for i in 0..4 {
            tree.insert(DVec2::new(10.0 + i as f64, 10.0), i);
        }
        // Forces a split; (50, 50) sits on both dividing lines.
        assert!(tree.insert(DVec2::new(50.0, 50.0), 99));
        assert!(tree.depth() >= 1);
        assert_eq!(tree.query(&Rect::new(50.0, 50.0, 0.0, 0.0)), vec![99]);
        assert!(tree.query(&Rect::new(40.0, 40.0, 20.0, 20.0)).contains(&99));
    }

    #[test]
    fn query_outside_returns_nothing() {
        let mut tree = arena();
        tree.insert(DVec2::new(10.0, 10.0), 1);
        assert!(tree.query(&Rect::new(50.0, 50.0, 10.0, 10.0)).is_empty());
        assert!(tree.query(&Rect::new(200.0, 200.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn coincident_points_stop_at_depth_limit() {
        let mut tree = arena();
        for i in 0..200 {
            assert!(tree.insert(DVec2::new(33.0, 33.0), i));
        }
        assert_eq!(tree.len(), 200);
        assert!(tree.depth() <= MAX_DEPTH);
        assert_eq!(tree.query(&Rect::centered(DVec2::new(33.0, 33.0), 1.0)).len(), 200);
    }

    #[test]
    fn clear_resets_to_single_node() {
        let mut tree = arena();
        for i in 0..20 {
            tree.insert(DVec2::new(i as f64 * 4.0, i as f64 * 4.0), i);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.query(&tree.boundary()).is_empty());
    }

    proptest! {
        #[test]
        fn full_query_returns_every_point(
            points in proptest::collection::vec((0.0f64..=100.0, 0.0f64..=100.0), 0..300),
        ) {
            let mut tree = arena();
            for (i, (x, y)) in points.iter().enumerate() {
                prop_assert!(tree.insert(DVec2::new(*x, *y), i as u32));
            }
            let mut found = tree.query(&tree.boundary());
            found.sort_unstable();
            let expected: Vec<u32> = (0..points.len() as u32).collect();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn query_is_idempotent_and_exact(
            points in proptest::collection::vec((0.0f64..=100.0, 0.0f64..=100.0), 0..200),
            x in 0.0f64..100.0,
            y in 0.0f64..100.0,
            w in 0.0f64..60.0,
            h in 0.0f64..60.0,
        ) {
            let mut tree = arena();
            for (i, (px, py)) in points.iter().enumerate() {
                tree.insert(DVec2::new(*px, *py), i as u32);
            }
            let range = Rect::new(x, y, w, h);
            let mut first = tree.query(&range);
            let mut second = tree.query(&range);
            first.sort_unstable();
            second.sort_unstable();
            prop_assert_eq!(&first, &second);

            let brute: Vec<u32> = points
                .iter()
                .enumerate()
                .filter(|(_, (px, py))| range.contains(DVec2::new(*px, *py)))
                .map(|(i, _)| i as u32)
                .collect();
            prop_assert_eq!(first, brute);
        }
    }
}
