//! Two-pass weighted circle-packing layout.
//!
//! Siblings are packed with a front-chain placement and each parent becomes
//! the minimum enclosing circle of its padded children; the whole layout is
//! then scaled onto the canvas. The packing runs twice: the first pass learns
//! every circle's aggregated value so its title pseudo-node can be weighted as
//! a fraction of it, the second pass re-packs with titles competing for space
//! under the sibling ordering tie-break (roles, then circles, then titles).

use super::hierarchy::{AnnotatedTree, NodeKind};
use super::types::RoleType;

/// Design-space canvas diameter.
pub const DIAMETER: f64 = 480.0;
/// Gap kept free around the packed root.
pub const MARGIN: f64 = 20.0;
/// Spacing between sibling disks.
pub const PADDING: f64 = 3.0;

/// Share of a circle's aggregated value granted to its title pseudo-node.
const TITLE_SHARE: f64 = 0.4;

/// A laid-out node. Coordinates are centered on the canvas origin; the root
/// is index 0 of the packed list and the list order is depth-first.
#[derive(Clone, Debug)]
pub struct PackedNode {
	pub kind: NodeKind,
	pub uid: String,
	pub name: String,
	pub role_type: RoleType,
	/// Absolute nesting depth reported by the API (titles carry their
	/// parent's; see [`super::hierarchy`]).
	pub depth: u32,
	/// Distance from the packed root; a circle's title sits one level below it.
	pub level: u32,
	pub member_count: usize,
	pub x: f64,
	pub y: f64,
	pub r: f64,
}

/// Packs an annotated tree onto the default canvas.
pub fn pack(tree: &AnnotatedTree) -> Vec<PackedNode> {
	pack_with(tree, DIAMETER, MARGIN, PADDING)
}

/// Packs an annotated tree onto a canvas of the given diameter.
pub fn pack_with(tree: &AnnotatedTree, diameter: f64, margin: f64, padding: f64) -> Vec<PackedNode> {
	let n = tree.len();
	if n == 0 {
		return Vec::new();
	}

	let children: Vec<Vec<usize>> = tree.nodes.iter().map(|nd| nd.children.clone()).collect();

	// Pass 1: real nodes only; titles carry no weight yet.
	let mut weights: Vec<f64> = tree
		.nodes
		.iter()
		.map(|nd| match nd.kind {
			NodeKind::Title => 0.0,
			_ => 1.0 / (f64::from(nd.depth) + 1.0),
		})
		.collect();
	let values = aggregate(&children, &weights);
	let _ = layout(&children, &values, diameter, margin, padding);

	// Each title's weight is a fixed share of the value its parent packed at.
	for (idx, nd) in tree.nodes.iter().enumerate() {
		for &c in &nd.children {
			if tree.nodes[c].kind == NodeKind::Title {
				weights[c] = TITLE_SHARE * values[idx];
			}
		}
	}

	// Pass 2: final weights, siblings ordered role < circle < title.
	let sorted: Vec<Vec<usize>> = children
		.iter()
		.map(|kids| {
			let mut kids = kids.clone();
			kids.sort_by_key(|&i| kind_rank(tree.nodes[i].kind));
			kids
		})
		.collect();
	let values = aggregate(&sorted, &weights);
	let geo = layout(&sorted, &values, diameter, margin, padding);

	// Hierarchy levels; parents always precede children in the arena.
	let mut level = vec![0u32; n];
	for (idx, kids) in children.iter().enumerate() {
		for &c in kids {
			level[c] = level[idx] + 1;
		}
	}

	tree.nodes
		.iter()
		.enumerate()
		.map(|(i, nd)| PackedNode {
			kind: nd.kind,
			uid: nd.uid.clone(),
			name: nd.name.clone(),
			role_type: nd.role_type,
			depth: nd.depth,
			level: level[i],
			member_count: nd.member_count,
			x: geo[i].x,
			y: geo[i].y,
			r: geo[i].r,
		})
		.collect()
}

fn kind_rank(kind: NodeKind) -> u8 {
	match kind {
		NodeKind::Role => 0,
		NodeKind::Circle => 1,
		NodeKind::Title => 2,
	}
}

/// Aggregated value per node: own weight plus all descendant weights.
fn aggregate(children: &[Vec<usize>], weights: &[f64]) -> Vec<f64> {
	let mut values = weights.to_vec();
	// Children have larger arena indices, so a reverse sweep aggregates bottom-up.
	for idx in (0..children.len()).rev() {
		for &c in &children[idx] {
			values[idx] += values[c];
		}
	}
	values
}

#[derive(Clone, Copy, Debug, Default)]
struct Geo {
	x: f64,
	y: f64,
	r: f64,
}

/// Runs the packing geometry: bottom-up sibling packing (leaf radius is the
/// square root of its value), then a top-down scale-and-translate so the root
/// fills `diameter - margin` centered on the origin.
fn layout(children: &[Vec<usize>], values: &[f64], diameter: f64, margin: f64, padding: f64) -> Vec<Geo> {
	let n = values.len();
	let mut geo = vec![Geo::default(); n];
	let size = diameter - margin;

	// An unpadded pass estimates the root radius so the configured padding can
	// be expressed in the layout's own units before the real pass.
	bottom_up(0, children, values, 0.0, &mut geo);
	let r0 = geo[0].r;
	if r0 <= 0.0 {
		return geo;
	}
	let pad = padding * r0 / size;
	bottom_up(0, children, values, pad, &mut geo);

	let k = size / (2.0 * geo[0].r);
	geo[0].x = 0.0;
	geo[0].y = 0.0;
	geo[0].r *= k;
	top_down(0, children, k, &mut geo);
	geo
}

fn bottom_up(idx: usize, children: &[Vec<usize>], values: &[f64], pad: f64, geo: &mut [Geo]) {
	let kids = &children[idx];
	if kids.is_empty() {
		geo[idx].r = values[idx].max(0.0).sqrt();
		return;
	}
	for &c in kids {
		bottom_up(c, children, values, pad, geo);
	}

	let mut disks: Vec<Disk> =
		kids.iter().map(|&c| Disk { x: 0.0, y: 0.0, r: geo[c].r + pad }).collect();
	let enclose_r = pack_siblings(&mut disks);
	for (&c, d) in kids.iter().zip(&disks) {
		geo[c].x = d.x;
		geo[c].y = d.y;
	}
	geo[idx].r = enclose_r + pad;
}

fn top_down(idx: usize, children: &[Vec<usize>], k: f64, geo: &mut [Geo]) {
	let (px, py) = (geo[idx].x, geo[idx].y);
	for &c in &children[idx] {
		geo[c].x = px + k * geo[c].x;
		geo[c].y = py + k * geo[c].y;
		geo[c].r *= k;
		top_down(c, children, k, geo);
	}
}

#[derive(Clone, Copy, Debug, Default)]
struct Disk {
	x: f64,
	y: f64,
	r: f64,
}

/// Positions `c` tangent to both `a` and `b`, on the outside of the chain.
fn place(b: Disk, a: Disk, c: &mut Disk) {
	let dx = b.x - a.x;
	let dy = b.y - a.y;
	let d2 = dx * dx + dy * dy;
	if d2 > 0.0 {
		let a2 = (a.r + c.r) * (a.r + c.r);
		let b2 = (b.r + c.r) * (b.r + c.r);
		if a2 > b2 {
			let x = (d2 + b2 - a2) / (2.0 * d2);
			let y = (b2 / d2 - x * x).max(0.0).sqrt();
			c.x = b.x - x * dx - y * dy;
			c.y = b.y - x * dy + y * dx;
		} else {
			let x = (d2 + a2 - b2) / (2.0 * d2);
			let y = (a2 / d2 - x * x).max(0.0).sqrt();
			c.x = a.x + x * dx - y * dy;
			c.y = a.y + x * dy + y * dx;
		}
	} else {
		c.x = a.x + c.r;
		c.y = a.y;
	}
}

fn intersects(a: Disk, b: Disk) -> bool {
	let dr = a.r + b.r - 1e-6;
	let dx = b.x - a.x;
	let dy = b.y - a.y;
	dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Packs the disks tightly around the origin, mutating their positions, and
/// returns the radius of their minimum enclosing circle. Front-chain
/// placement: each disk is placed tangent to the chain pair closest to the
/// area centroid, backing up along the chain when the candidate overlaps.
fn pack_siblings(disks: &mut [Disk]) -> f64 {
	let n = disks.len();
	if n == 0 {
		return 0.0;
	}

	disks[0].x = 0.0;
	disks[0].y = 0.0;
	if n == 1 {
		return disks[0].r;
	}

	disks[0].x = -disks[1].r;
	disks[1].x = disks[0].r;
	disks[1].y = 0.0;
	if n == 2 {
		return disks[0].r + disks[1].r;
	}

	let mut c = disks[2];
	place(disks[1], disks[0], &mut c);
	disks[2] = c;

	// Front chain as a doubly linked ring over disk indices.
	let mut next = vec![0usize; n];
	let mut prev = vec![0usize; n];
	next[0] = 1;
	next[1] = 2;
	next[2] = 0;
	prev[0] = 2;
	prev[1] = 0;
	prev[2] = 1;

	let score = |disks: &[Disk], next: &[usize], i: usize| -> f64 {
		let a = disks[i];
		let b = disks[next[i]];
		let ab = a.r + b.r;
		let dx = (a.x * b.r + b.x * a.r) / ab;
		let dy = (a.y * b.r + b.y * a.r) / ab;
		dx * dx + dy * dy
	};

	let mut a = 0usize;
	let mut b = 1usize;
	let mut i = 3;
	'pack: while i < n {
		let mut cand = disks[i];
		place(disks[a], disks[b], &mut cand);
		disks[i] = cand;

		// Find the closest intersecting disk on the chain, measured by linear
		// distance along it in both directions.
		let mut j = next[b];
		let mut k = prev[a];
		let mut sj = disks[b].r;
		let mut sk = disks[a].r;
		loop {
			if sj <= sk {
				if intersects(disks[j], disks[i]) {
					b = j;
					next[a] = b;
					prev[b] = a;
					continue 'pack;
				}
				sj += disks[j].r;
				j = next[j];
			} else {
				if intersects(disks[k], disks[i]) {
					a = k;
					next[a] = b;
					prev[b] = a;
					continue 'pack;
				}
				sk += disks[k].r;
				k = prev[k];
			}
			if j == next[k] {
				break;
			}
		}

		// Insert the new disk between a and b.
		prev[i] = a;
		next[i] = b;
		next[a] = i;
		prev[b] = i;
		b = i;

		// Re-anchor the chain at the pair closest to the origin.
		let mut best = score(disks, &next, a);
		let mut cn = next[b];
		while cn != b {
			let s = score(disks, &next, cn);
			if s < best {
				a = cn;
				best = s;
			}
			cn = next[cn];
		}
		b = next[a];

		i += 1;
	}

	// Enclose the front chain and recenter everything on the origin.
	let mut chain = vec![disks[b]];
	let mut cn = next[b];
	while cn != b {
		chain.push(disks[cn]);
		cn = next[cn];
	}
	let e = enclose(&chain);
	for d in disks.iter_mut() {
		d.x -= e.x;
		d.y -= e.y;
	}
	e.r
}

/// Minimum enclosing circle over a set of disks (Welzl's move-to-front over
/// the input order, so the result is deterministic).
fn enclose(disks: &[Disk]) -> Disk {
	let mut e: Option<Disk> = None;
	let mut basis: Vec<Disk> = Vec::new();
	let mut i = 0;
	while i < disks.len() {
		let p = disks[i];
		match e {
			Some(en) if encloses_weak(en, p) => i += 1,
			_ => {
				basis = extend_basis(&basis, p);
				e = Some(enclose_basis(&basis));
				i = 0;
			}
		}
	}
	e.unwrap_or_default()
}

fn extend_basis(basis: &[Disk], p: Disk) -> Vec<Disk> {
	if encloses_weak_all(p, basis) {
		return vec![p];
	}

	// A basis of two suffices when one existing element stays on the hull.
	for &a in basis {
		if encloses_not(p, a) && encloses_weak_all(enclose_basis2(a, p), basis) {
			return vec![a, p];
		}
	}

	for i in 0..basis.len() {
		for j in (i + 1)..basis.len() {
			let (a, b) = (basis[i], basis[j]);
			if encloses_not(enclose_basis2(a, b), p)
				&& encloses_not(enclose_basis2(a, p), b)
				&& encloses_not(enclose_basis2(b, p), a)
				&& encloses_weak_all(enclose_basis3(a, b, p), basis)
			{
				return vec![a, b, p];
			}
		}
	}

	unreachable!("enclosing basis never exceeds three disks");
}

fn encloses_not(a: Disk, b: Disk) -> bool {
	let dr = a.r - b.r;
	let dx = b.x - a.x;
	let dy = b.y - a.y;
	dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Disk, b: Disk) -> bool {
	let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
	let dx = b.x - a.x;
	let dy = b.y - a.y;
	dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Disk, basis: &[Disk]) -> bool {
	basis.iter().all(|&b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Disk]) -> Disk {
	match basis {
		[a] => *a,
		[a, b] => enclose_basis2(*a, *b),
		[a, b, c] => enclose_basis3(*a, *b, *c),
		_ => unreachable!("basis holds one to three disks"),
	}
}

fn enclose_basis2(a: Disk, b: Disk) -> Disk {
	let x21 = b.x - a.x;
	let y21 = b.y - a.y;
	let r21 = b.r - a.r;
	let l = (x21 * x21 + y21 * y21).sqrt();
	Disk {
		x: (a.x + b.x + x21 / l * r21) / 2.0,
		y: (a.y + b.y + y21 / l * r21) / 2.0,
		r: (l + a.r + b.r) / 2.0,
	}
}

fn enclose_basis3(a: Disk, b: Disk, c: Disk) -> Disk {
	let (x1, y1, r1) = (a.x, a.y, a.r);
	let (x2, y2, r2) = (b.x, b.y, b.r);
	let (x3, y3, r3) = (c.x, c.y, c.r);
	let a2 = x1 - x2;
	let a3 = x1 - x3;
	let b2 = y1 - y2;
	let b3 = y1 - y3;
	let c2 = r2 - r1;
	let c3 = r3 - r1;
	let d1 = x1 * x1 + y1 * y1 - r1 * r1;
	let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
	let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
	let ab = a3 * b2 - a2 * b3;
	let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
	let xb = (b3 * c2 - b2 * c3) / ab;
	let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
	let yb = (a2 * c3 - a3 * c2) / ab;
	let qa = xb * xb + yb * yb - 1.0;
	let qb = 2.0 * (r1 + xa * xb + ya * yb);
	let qc = xa * xa + ya * ya - r1 * r1;
	let r = -if qa.abs() > 1e-6 { (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa) } else { qc / qb };
	Disk { x: x1 + xa + xb * r, y: y1 + ya + yb * r, r }
}
