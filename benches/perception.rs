use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chemcrab_perceive::{
    calc_bond_directions, calc_bond_orders, perceive_kekule_structure, Atom, Bond, BondConfiguration, BondOrder,
    BondStereoDescriptor, BronKerbosch, EdgeIndex, Mol, NodeIndex, ResonanceStructureGenerator, WithPosition3D,
};
use petgraph::graph::UnGraph;

fn atom(z: u8, q: i8, h: u8) -> Atom {
    Atom {
        atomic_num: z,
        formal_charge: q,
        isotope: 0,
        hydrogen_count: h,
    }
}

fn mol(atoms: &[(u8, i8, u8)], bonds: &[(usize, usize, u8)]) -> Mol<Atom, Bond> {
    let mut m = Mol::new();
    for &(z, q, h) in atoms {
        m.add_atom(atom(z, q, h));
    }
    for &(a, b, order) in bonds {
        m.add_bond(NodeIndex::new(a), NodeIndex::new(b), Bond { order: BondOrder::from_u8(order) });
    }
    m
}

/// Fused chain of `n` benzene rings (linear acenes), undefined bonds.
fn acene(n: usize) -> Mol<Atom, Bond> {
    let atoms = 4 * n + 2;
    let mut bonds = Vec::new();
    // Top row 0..=2n, bottom row 2n+1..4n+1, rungs every second atom.
    for i in 0..2 * n {
        bonds.push((i, i + 1, 0));
        bonds.push((2 * n + 1 + i, 2 * n + 2 + i, 0));
    }
    for k in 0..=n {
        bonds.push((2 * k, 2 * n + 1 + 2 * k, 0));
    }
    let h: Vec<(u8, i8, u8)> = (0..atoms)
        .map(|i| {
            let col = if i <= 2 * n { i } else { i - 2 * n - 1 };
            let rung = col % 2 == 0 && col != 0 && col != 2 * n;
            (6, 0, if rung { 0 } else { 1 })
        })
        .collect();
    mol(&h, &bonds)
}

fn bench_kekule(c: &mut Criterion) {
    let naphthalene = acene(2);
    let pentacene = acene(5);

    let mut group = c.benchmark_group("kekule");
    group.bench_function("naphthalene", |b| {
        b.iter(|| {
            let mut orders = vec![0; naphthalene.bond_count()];
            black_box(perceive_kekule_structure(black_box(&naphthalene), &mut orders).unwrap())
        })
    });
    group.bench_function("pentacene", |b| {
        b.iter(|| {
            let mut orders = vec![0; pentacene.bond_count()];
            black_box(perceive_kekule_structure(black_box(&pentacene), &mut orders).unwrap())
        })
    });
    group.finish();
}

fn bench_bond_orders(c: &mut Criterion) {
    let mut benzene: Mol<WithPosition3D<Atom>, Bond> = Mol::new();
    for i in 0..6 {
        let t = std::f64::consts::PI / 3.0 * i as f64;
        benzene.add_atom(WithPosition3D::new(atom(6, 0, 1), 1.39 * t.cos(), 1.39 * t.sin(), 0.0));
    }
    for i in 0..6 {
        benzene.add_bond(NodeIndex::new(i), NodeIndex::new((i + 1) % 6), Bond::undefined());
    }

    c.bench_function("bond_orders_benzene", |b| {
        b.iter(|| {
            let mut orders = Vec::new();
            black_box(calc_bond_orders(black_box(&benzene), &mut orders).unwrap())
        })
    });
}

fn bench_stereo(c: &mut Criterion) {
    // Deca-2,4,6,8-tetraene with alternating configurations.
    let n = 10;
    let atoms: Vec<(u8, i8, u8)> = (0..n).map(|i| (6, 0, if i == 0 || i == n - 1 { 3 } else { 1 })).collect();
    let bonds: Vec<(usize, usize, u8)> = (0..n - 1).map(|i| (i, i + 1, if i % 2 == 1 { 2 } else { 1 })).collect();
    let mut polyene = mol(&atoms, &bonds);
    for (k, bond) in (1..n - 1).step_by(2).enumerate() {
        polyene.add_bond_stereo(BondStereoDescriptor {
            bond: EdgeIndex::new(bond),
            refs: [bond - 1, bond, bond + 1, bond + 2].map(NodeIndex::new),
            config: if k % 2 == 0 { BondConfiguration::Trans } else { BondConfiguration::Cis },
        });
    }

    c.bench_function("directions_tetraene", |b| {
        b.iter(|| {
            let mut dirs = Vec::new();
            black_box(calc_bond_directions(black_box(&polyene), &mut dirs))
        })
    });
}

fn bench_resonance(c: &mut Criterion) {
    let benzene = mol(&[(6, 0, 1); 6], &[(0, 1, 2), (1, 2, 1), (2, 3, 2), (3, 4, 1), (4, 5, 2), (5, 0, 1)]);
    let mut generator = ResonanceStructureGenerator::new();

    c.bench_function("resonance_benzene", |b| {
        b.iter(|| black_box(generator.generate(black_box(&benzene)).unwrap()))
    });
}

fn bench_cliques(c: &mut Criterion) {
    let mut g = UnGraph::<(), ()>::new_undirected();
    let nodes: Vec<_> = (0..40).map(|_| g.add_node(())).collect();
    for i in 0..40 {
        for j in i + 1..40 {
            if (i * 7 + j * 13) % 3 != 0 {
                g.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    let mut bk = BronKerbosch::new();
    let mut clique = Vec::new();

    c.bench_function("cliques_40", |b| {
        b.iter(|| {
            bk.init(&g);
            let mut count = 0;
            while bk.next_clique(&mut clique) {
                count += 1;
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_kekule, bench_bond_orders, bench_stereo, bench_resonance, bench_cliques);
criterion_main!(benches);
