//! Exact synthesis: decompose a unitary over `D[omega]` into a gate word.
//!
//! The cost gauge is the smallest denominator exponent
//! `sde(x) = max(2 e_int, 2 e_sqrt - 1, 0)` of `|U_00|^2`. While it exceeds
//! 3, exactly one of the four prefixes `H (T^dag H)^i`, `i = 0..3`, lowers
//! it by one (Kliuchnikov-Maslov-Mosca, arXiv:1206.5236); the descent
//! records `T^i H` and repeats. The residue is then a member of the finite
//! `S3` table of all exact unitaries with sde at most 3, each paired with a
//! canonical word, and the concatenation is Matsumoto-Amano normalized.
//!
//! The `S3` table is produced once per process by the bounded breadth-first
//! walk over `{H, T}` products ([`S3Table::generate`]); it can also be
//! cached out of line as whitespace-separated ASCII (entry count, then per
//! entry the 32 dyadic components of the matrix in row-major order followed
//! by the gate word).

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::OnceLock;

use log::warn;
use num_bigint::BigInt;
use thiserror::Error;

use crate::dyadic::Dyadic;
use crate::gate::{Atom, CliffordDatabase, Gate};
use crate::matrix::{mcd2, MCD2};
use crate::ring::{CD2, D2};

/// Smallest `k >= 0` with `2^k x` in `Z[sqrt 2]`.
pub fn sde(x: &D2) -> i32 {
    let a = 2 * x.int().den_exp() as i32;
    let b = 2 * x.sqrt().den_exp() as i32 - 1;
    a.max(b).max(0)
}

/// Frontier bound of the table walk: one above the table membership bound.
const MAX_SDE: i32 = 4;
const MAX_DEPTH: u32 = 30;

#[derive(Debug, Error)]
pub enum S3FormatError {
    #[error("unexpected end of S3 table data")]
    UnexpectedEnd,
    #[error("malformed integer `{0}` in S3 table")]
    MalformedInteger(String),
    #[error("malformed gate word `{0}` in S3 table")]
    MalformedGate(String),
}

/// All exact unitaries with `sde(|U_00|^2) <= 3`, each with a word whose
/// matrix reproduces it exactly.
pub struct S3Table {
    entries: Vec<(MCD2, Gate)>,
    index: HashMap<MCD2, usize>,
}

impl S3Table {
    /// Bounded BFS over left products by `H` and `T`, keeping states whose
    /// sde stays within the frontier bound.
    pub fn generate() -> S3Table {
        let mut entries = vec![(mcd2::I.clone(), Gate::new())];
        let mut visited: HashSet<MCD2> = HashSet::new();
        visited.insert(mcd2::I.clone());
        let mut frontier = VecDeque::new();
        frontier.push_back((mcd2::I.clone(), Gate::new()));
        let mut next = VecDeque::new();

        for _depth in 0..=MAX_DEPTH {
            while let Some((top, word)) = frontier.pop_front() {
                for a in [Atom::H, Atom::T] {
                    let m = a.mat() * top.clone();
                    if visited.contains(&m) {
                        continue;
                    }
                    let s = sde(&m.get(0, 0).norm());
                    if s <= MAX_SDE {
                        visited.insert(m.clone());
                        next.push_back((m.clone(), a * word.clone()));
                    }
                    if s <= 3 {
                        entries.push((m, a * word.clone()));
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
            if frontier.is_empty() {
                break;
            }
        }

        S3Table::from_entries(entries)
    }

    fn from_entries(entries: Vec<(MCD2, Gate)>) -> S3Table {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, (m, _)) in entries.iter().enumerate() {
            index.entry(m.clone()).or_insert(i);
        }
        S3Table { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, m: &MCD2) -> Option<&Gate> {
        self.index.get(m).map(|&i| &self.entries[i].1)
    }

    /// Parse the ASCII wire layout.
    pub fn load(text: &str) -> Result<S3Table, S3FormatError> {
        struct Tokens<'a>(std::str::SplitWhitespace<'a>);
        impl<'a> Tokens<'a> {
            fn token(&mut self) -> Result<&'a str, S3FormatError> {
                self.0.next().ok_or(S3FormatError::UnexpectedEnd)
            }
            fn int(&mut self) -> Result<BigInt, S3FormatError> {
                let t = self.token()?;
                t.parse()
                    .map_err(|_| S3FormatError::MalformedInteger(t.to_string()))
            }
            fn exp(&mut self) -> Result<u32, S3FormatError> {
                let t = self.token()?;
                t.parse()
                    .map_err(|_| S3FormatError::MalformedInteger(t.to_string()))
            }
            fn dyadic(&mut self) -> Result<Dyadic, S3FormatError> {
                Ok(Dyadic::new(self.int()?, self.exp()?))
            }
            fn cell(&mut self) -> Result<CD2, S3FormatError> {
                let re = D2::new(self.dyadic()?, self.dyadic()?);
                let im = D2::new(self.dyadic()?, self.dyadic()?);
                Ok(CD2::new(re, im))
            }
        }

        let mut tokens = Tokens(text.split_whitespace());
        let count: usize = {
            let t = tokens.token()?;
            t.parse()
                .map_err(|_| S3FormatError::MalformedInteger(t.to_string()))?
        };
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let m = MCD2::new(
                tokens.cell()?,
                tokens.cell()?,
                tokens.cell()?,
                tokens.cell()?,
            );
            let word = tokens.token()?;
            let gate: Gate = word
                .parse()
                .map_err(|_| S3FormatError::MalformedGate(word.to_string()))?;
            entries.push((m, gate));
        }
        Ok(S3Table::from_entries(entries))
    }

    /// Emit the same layout [`S3Table::load`] reads.
    pub fn store_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.entries.len());
        for (m, gate) in &self.entries {
            for row in 0..2 {
                for col in 0..2 {
                    let x = m.get(row, col);
                    let _ = write!(
                        out,
                        "{} {} {} {} {} {} {} {} ",
                        x.re().int().num(),
                        x.re().int().den_exp(),
                        x.re().sqrt().num(),
                        x.re().sqrt().den_exp(),
                        x.im().int().num(),
                        x.im().int().den_exp(),
                        x.im().sqrt().num(),
                        x.im().sqrt().den_exp(),
                    );
                }
            }
            let _ = writeln!(out, "{}", gate);
        }
        out
    }

    /// Out-of-line cache: read the table from `path` if it parses, otherwise
    /// generate it and try to leave a fresh cache behind.
    pub fn load_or_generate(path: &Path) -> S3Table {
        if let Ok(text) = std::fs::read_to_string(path) {
            match S3Table::load(&text) {
                Ok(table) => return table,
                Err(err) => warn!("ignoring unreadable S3 cache {}: {}", path.display(), err),
            }
        }
        let table = S3Table::generate();
        if let Err(err) = std::fs::write(path, table.store_string()) {
            warn!("failed to cache S3 table at {}: {}", path.display(), err);
        }
        table
    }

    /// Process-wide instance, generated on first use.
    pub fn shared() -> &'static S3Table {
        static TABLE: OnceLock<S3Table> = OnceLock::new();
        TABLE.get_or_init(S3Table::generate)
    }
}

/// Decomposes exact unitaries over `D[omega]` into normalized gate words.
pub struct UnitaryDecomposer {
    s3: &'static S3Table,
    clifford: CliffordDatabase,
}

impl UnitaryDecomposer {
    pub fn new() -> Self {
        UnitaryDecomposer {
            s3: S3Table::shared(),
            clifford: CliffordDatabase::new(),
        }
    }

    /// Decompose `input` into a word with the same exact matrix.
    ///
    /// # Panics
    ///
    /// Panics when the descent cannot lower the sde or the residue is
    /// missing from the table; either means `input` was not an exact unitary
    /// over `D[omega]`.
    pub fn decompose(&self, input: &MCD2) -> Gate {
        let mut unitary = input.clone();
        let mut s = sde(&unitary.get(0, 0).norm());
        let mut output = Gate::new();

        while s > 3 {
            let mut tmp = mcd2::H.clone() * unitary.clone();
            let mut found = false;
            for i in 0..4 {
                let tmp_s = sde(&tmp.get(0, 0).norm());
                if tmp_s == s - 1 {
                    s = tmp_s;
                    for _ in 0..i {
                        output.push(Atom::T);
                    }
                    output.push(Atom::H);
                    unitary = tmp.clone();
                    found = true;
                    break;
                }
                tmp.mul_from_left(&mcd2::STEP);
            }
            assert!(found, "sde descent stalled; input is not an exact unitary");
        }

        let residue = self
            .s3
            .lookup(&unitary)
            .expect("unitary with sde <= 3 missing from the S3 table");
        output.extend(residue);

        output.normalize(&self.clifford);
        output
    }
}

impl Default for UnitaryDecomposer {
    fn default() -> Self {
        UnitaryDecomposer::new()
    }
}
