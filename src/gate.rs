//! Gate words over `{I, H, S, T, X, Y, Z, W}` and their normalization.
//!
//! A [`Gate`] is an ordered atom sequence; two gates are equal only when
//! they are identical sequences (equality up to matrix is a separate check
//! through [`Gate::mat`]). `W = omega I` is the global-phase atom, so every
//! matrix below is exact over `D[omega]` with no quotient by phase.
//!
//! [`CliffordDatabase`] enumerates `C_T`, the 64-element group generated by
//! `{S, X, W}`, then the 192-element `C_1 = C_T + H C_T + S H C_T` indexed
//! contiguously in that order, together with the T-move table
//! `move[i] = index(T^dag C_T[i] T)`. [`Gate::normalize`] uses it to rewrite
//! any word into Matsumoto-Amano normal form (arXiv:0806.3834), which never
//! increases the T-count and preserves the exact matrix.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use thiserror::Error;

use crate::matrix::{mcd2, MCD2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    I,
    H,
    S,
    T,
    X,
    Y,
    Z,
    W,
}

impl Atom {
    pub fn from_char(c: char) -> Option<Atom> {
        match c.to_ascii_uppercase() {
            'I' => Some(Atom::I),
            'H' => Some(Atom::H),
            'S' => Some(Atom::S),
            'T' => Some(Atom::T),
            'X' => Some(Atom::X),
            'Y' => Some(Atom::Y),
            'Z' => Some(Atom::Z),
            'W' => Some(Atom::W),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Atom::I => 'I',
            Atom::H => 'H',
            Atom::S => 'S',
            Atom::T => 'T',
            Atom::X => 'X',
            Atom::Y => 'Y',
            Atom::Z => 'Z',
            Atom::W => 'W',
        }
    }

    pub fn is_clifford(self) -> bool {
        self != Atom::T
    }

    pub fn mat(self) -> MCD2 {
        match self {
            Atom::I => mcd2::I.clone(),
            Atom::H => mcd2::H.clone(),
            Atom::S => mcd2::S.clone(),
            Atom::T => mcd2::T.clone(),
            Atom::X => mcd2::X.clone(),
            Atom::Y => mcd2::Y.clone(),
            Atom::Z => mcd2::Z.clone(),
            Atom::W => mcd2::W.clone(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, Error)]
#[error("unknown gate character `{0}`")]
pub struct UnknownAtom(pub char);

/// An ordered, possibly empty, word of atoms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gate {
    atoms: Vec<Atom>,
}

impl Gate {
    pub fn new() -> Gate {
        Gate { atoms: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn get(&self, idx: usize) -> Atom {
        self.atoms[idx]
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn push(&mut self, a: Atom) {
        self.atoms.push(a);
    }

    pub fn extend(&mut self, g: &Gate) {
        self.atoms.extend_from_slice(&g.atoms);
    }

    pub fn count_t(&self) -> usize {
        self.atoms.iter().filter(|a| **a == Atom::T).count()
    }

    pub fn is_clifford(&self) -> bool {
        self.atoms.iter().all(|a| a.is_clifford())
    }

    pub fn mat(&self) -> MCD2 {
        let mut ret = MCD2::identity();
        for a in &self.atoms {
            ret = ret * a.mat();
        }
        ret
    }

    /// Rewrites the word into Matsumoto-Amano normal form: a maximal chain
    /// of `T`, `HT`, `SHT` syllables followed by a single Clifford read off
    /// the database. The matrix is unchanged; the T-count never grows.
    ///
    /// # Panics
    ///
    /// Panics when the residual matrix falls outside `C_1`, which means the
    /// input word was corrupted (a non-atom matrix slipped in).
    pub fn normalize(&mut self, db: &CliffordDatabase) {
        let t_gate = Gate::from(Atom::T);
        let mut normal: Vec<Gate> = Vec::new();
        let mut clifford = mcd2::I.clone();
        for &a in &self.atoms {
            if a != Atom::T {
                clifford = clifford * a.mat();
                continue;
            }
            let index = db
                .search_index(&clifford)
                .expect("residual matrix escaped the Clifford group");
            let mv = db.t_move(index);
            match CliffordDatabase::coset_class(index) {
                CosetClass::Ct => {
                    // T commutes into the pending Clifford; a trailing T pair
                    // merges into S.
                    if normal.last() == Some(&t_gate) {
                        normal.pop();
                        if let Some(prev) = normal.pop() {
                            clifford = prev.mat() * mcd2::S.clone() * db.matrix(mv).clone();
                        } else {
                            clifford = mcd2::S.clone() * db.matrix(mv).clone();
                        }
                    } else {
                        normal.push(t_gate.clone());
                        clifford = db.matrix(mv).clone();
                    }
                }
                CosetClass::Hct => {
                    normal.push(Gate::from(Atom::H));
                    normal.push(t_gate.clone());
                    clifford = db.matrix(mv).clone();
                }
                CosetClass::Shct => {
                    normal.push(Atom::S * Atom::H);
                    normal.push(t_gate.clone());
                    clifford = db.matrix(mv).clone();
                }
            }
        }
        if clifford != *mcd2::I {
            let index = db
                .search_index(&clifford)
                .expect("residual matrix escaped the Clifford group");
            normal.push(db.gate(index).clone());
        }

        self.atoms.clear();
        for g in &normal {
            self.atoms.extend_from_slice(&g.atoms);
        }
    }
}

impl From<Atom> for Gate {
    fn from(a: Atom) -> Gate {
        Gate { atoms: vec![a] }
    }
}

impl FromStr for Gate {
    type Err = UnknownAtom;

    fn from_str(s: &str) -> Result<Gate, UnknownAtom> {
        let mut atoms = Vec::with_capacity(s.len());
        for c in s.chars() {
            atoms.push(Atom::from_char(c).ok_or(UnknownAtom(c))?);
        }
        Ok(Gate { atoms })
    }
}

/// The empty word prints as `I`.
impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.atoms.is_empty() {
            return write!(f, "I");
        }
        for a in &self.atoms {
            write!(f, "{}", a)?;
        }
        Ok(())
    }
}

impl Mul for Gate {
    type Output = Gate;
    fn mul(mut self, rhs: Gate) -> Gate {
        self.atoms.extend_from_slice(&rhs.atoms);
        self
    }
}

impl Mul<Atom> for Gate {
    type Output = Gate;
    fn mul(mut self, rhs: Atom) -> Gate {
        self.atoms.push(rhs);
        self
    }
}

impl Mul<Gate> for Atom {
    type Output = Gate;
    fn mul(self, rhs: Gate) -> Gate {
        let mut g = Gate::from(self);
        g.atoms.extend_from_slice(&rhs.atoms);
        g
    }
}

impl Mul for Atom {
    type Output = Gate;
    fn mul(self, rhs: Atom) -> Gate {
        Gate {
            atoms: vec![self, rhs],
        }
    }
}

/// Which block of `C_1` an index belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CosetClass {
    Ct,
    Hct,
    Shct,
}

const NUM_CT: usize = 64;
const NUM_ELEMENTS: usize = 192;

/// `C_1` with exact matrices, canonical words, and the T-move table.
pub struct CliffordDatabase {
    c1: Vec<(MCD2, Gate)>,
    index: HashMap<MCD2, usize>,
    moves: Vec<usize>,
}

impl CliffordDatabase {
    pub fn new() -> Self {
        // BFS of C_T = <S, X, W> by right multiplication.
        let mut queue = VecDeque::new();
        let mut c1: Vec<(MCD2, Gate)> = Vec::with_capacity(NUM_ELEMENTS);
        let mut index = HashMap::with_capacity(NUM_ELEMENTS);
        queue.push_back((mcd2::I.clone(), Gate::new()));
        index.insert(mcd2::I.clone(), 0);
        c1.push((mcd2::I.clone(), Gate::new()));
        while let Some((m, g)) = queue.pop_front() {
            for a in [Atom::S, Atom::X, Atom::W] {
                let n = m.clone() * a.mat();
                if !index.contains_key(&n) {
                    let word = g.clone() * a;
                    index.insert(n.clone(), c1.len());
                    c1.push((n.clone(), word.clone()));
                    queue.push_back((n, word));
                }
            }
        }
        debug_assert_eq!(c1.len(), NUM_CT);

        // Prefix blocks H C_T and S H C_T; the cosets are disjoint.
        for i in 0..NUM_CT {
            let (m, g) = c1[i].clone();
            let n = mcd2::H.clone() * m;
            let previous = index.insert(n.clone(), c1.len());
            debug_assert!(previous.is_none());
            c1.push((n, Atom::H * g));
        }
        for i in 0..NUM_CT {
            let (m, g) = c1[i].clone();
            let n = mcd2::S.clone() * mcd2::H.clone() * m;
            let previous = index.insert(n.clone(), c1.len());
            debug_assert!(previous.is_none());
            c1.push((n, Atom::S * (Atom::H * g)));
        }
        debug_assert_eq!(c1.len(), NUM_ELEMENTS);

        // T-move: T^dag C_T[i] T lands back in C_T.
        let mut moves = Vec::with_capacity(NUM_CT);
        for i in 0..NUM_CT {
            let n = mcd2::T_DAG.clone() * c1[i].0.clone() * mcd2::T.clone();
            let j = *index
                .get(&n)
                .expect("T-conjugated Clifford escaped the database");
            moves.push(j);
        }

        CliffordDatabase { c1, index, moves }
    }

    pub fn coset_class(idx: usize) -> CosetClass {
        if idx < NUM_CT {
            CosetClass::Ct
        } else if idx < 2 * NUM_CT {
            CosetClass::Hct
        } else {
            CosetClass::Shct
        }
    }

    pub fn len(&self) -> usize {
        self.c1.len()
    }

    pub fn search_index(&self, mat: &MCD2) -> Option<usize> {
        self.index.get(mat).copied()
    }

    pub fn matrix(&self, idx: usize) -> &MCD2 {
        &self.c1[idx].0
    }

    pub fn gate(&self, idx: usize) -> &Gate {
        &self.c1[idx].1
    }

    /// For `idx mod 64 = i`: the unique `j` with
    /// `T^dag C_T[i] T = C_T[j]` (phases included).
    pub fn t_move(&self, idx: usize) -> usize {
        self.moves[idx % NUM_CT]
    }
}

impl Default for CliffordDatabase {
    fn default() -> Self {
        CliffordDatabase::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(s: &str) -> Gate {
        s.parse().unwrap()
    }

    #[test]
    fn test_word_product() {
        assert_eq!((Atom::X * Atom::Y).to_string(), "XY");
        assert_eq!((Atom::Y * Atom::Z).to_string(), "YZ");
        let g = gate("HT") * gate("TH");
        assert_eq!(g.to_string(), "HTTH");
        // Matrix of a product is the product of matrices.
        assert_eq!(g.mat(), gate("HT").mat() * gate("TH").mat());
    }

    #[test]
    fn test_empty_word_prints_identity() {
        assert_eq!(Gate::new().to_string(), "I");
        assert_eq!(Gate::new().mat(), MCD2::identity());
    }

    #[test]
    fn test_count_t() {
        assert_eq!(gate("THTHT").count_t(), 3);
        assert_eq!(gate("HSXW").count_t(), 0);
        assert!(gate("HSXW").is_clifford());
        assert!(!gate("THT").is_clifford());
    }

    #[test]
    fn test_known_matrix_identities() {
        assert_eq!(gate("HSSH").mat(), gate("X").mat());
        assert_eq!(gate("SS").mat(), gate("Z").mat());
        assert_eq!(gate("HSHSHS").mat(), gate("W").mat());
        assert_eq!(gate("TT").mat(), gate("S").mat());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("HQT".parse::<Gate>().is_err());
        assert!("htsw".parse::<Gate>().is_ok());
    }

    #[test]
    fn test_clifford_database_shape() {
        let db = CliffordDatabase::new();
        assert_eq!(db.len(), 192);
        // Every stored word reproduces its matrix.
        for i in 0..db.len() {
            assert_eq!(db.gate(i).mat(), *db.matrix(i));
        }
        // The blocks are classified by index.
        assert_eq!(CliffordDatabase::coset_class(0), CosetClass::Ct);
        assert_eq!(CliffordDatabase::coset_class(64), CosetClass::Hct);
        assert_eq!(CliffordDatabase::coset_class(128), CosetClass::Shct);
        // T-moves stay inside C_T.
        for i in 0..64 {
            assert!(db.t_move(i) < 64);
            let lhs = mcd2::T_DAG.clone() * db.matrix(i).clone() * mcd2::T.clone();
            assert_eq!(lhs, *db.matrix(db.t_move(i)));
        }
    }

    #[test]
    fn test_normalize_preserves_matrix() {
        let db = CliffordDatabase::new();
        let input = "SHTHTHTHTHTHTHTSHTHTHTHTSHTHTHTHTHTSHTSHTHTHTHTHTSHTHTHTSHTSHTHTSHTSHTSHTHTHTHTSHTHTHTHTHT\
                     SHTSHTHTSHTHTSHTSHTSHTSHTHTSHTSHTSHTSHTHTHTSHTSHTSHTHTHTHTSHTHTSHTHTHTSHTHTHTHTSHTHTSHTHTS\
                     HTSHTSHTHTHTHTHTHTHTSHTHTSHTHTHTSHTSHTHTHTSHTSHTSHTHTSHTHTHTHTSHTSHTSHSSSWWWWWWW";
        let mut g = gate(input);
        let before = g.mat();
        let t_before = g.count_t();
        g.normalize(&db);
        assert_eq!(before, g.mat());
        assert!(g.count_t() <= t_before);
        // Same phase-free words map to the same matrix.
        assert_eq!(gate("SHSSSWWWWWWW").mat(), gate("SHSSXSSSXW").mat());
    }

    #[test]
    fn test_normalize_collapses_cliffords() {
        let db = CliffordDatabase::new();
        let mut g = gate("HH");
        g.normalize(&db);
        assert!(g.is_empty());
        let mut g = gate("TT");
        g.normalize(&db);
        assert_eq!(g.mat(), gate("S").mat());
        assert_eq!(g.count_t(), 0);
    }
}
