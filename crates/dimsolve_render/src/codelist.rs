//! Straight-line code rendering of an [`Op`] plan (§4.9, §6 "Op textual
//! form").
//!
//! Grounded on the original source's `gen_code.cc`: one visitor method per
//! op variant, an expression-text cache (here `HashMap<usize, String>`)
//! keyed by record identity so an operand that was itself the result of an
//! earlier op is referenced by name rather than recomputed inline.

use std::collections::HashMap;

use dimsolve_base::{Interner, Symbol};
use dimsolve_eval::Op;
use dimsolve_semantic::SemanticTable;

/// Renders `ops` as one statement per op, in emission order, using exactly
/// the textual forms of §6.
pub fn render_codelist(ops: &[Op], table: &SemanticTable, interner: &Interner) -> String {
    let mut renderer = CodeListRenderer { table, interner, cache: HashMap::new(), out: String::new() };
    renderer.render(ops);
    renderer.out
}

struct CodeListRenderer<'t> {
    table: &'t SemanticTable,
    interner: &'t Interner,
    cache: HashMap<usize, String>,
    out: String,
}

impl CodeListRenderer<'_> {
    fn render(&mut self, ops: &[Op]) {
        for op in ops {
            match *op {
                Op::Add { r, a, b, .. } => self.binary(r, a, b, "+"),
                Op::Sub { r, a, b, .. } => self.binary(r, a, b, "\u{2212}"),
                Op::Mul { r, a, b, .. } => self.binary(r, a, b, "\u{b7}"),
                Op::Div { r, a, b, .. } => self.binary(r, a, b, "/"),
                Op::Neg { r, a, .. } => {
                    let a = self.operand(a);
                    self.assign(r, format!("(\u{2212}{})", a));
                }
                Op::Exp { r, b, e, .. } => {
                    let b = self.operand(b);
                    self.assign(r, format!("pow({}, {})", b, e));
                }
                Op::Assign { d, s, .. } => {
                    let s = self.operand(s);
                    self.assign(d, s);
                }
                Op::Load { n, i, .. } => {
                    let name = self.interner.resolve(self.table.record(n).name).to_string();
                    self.out.push_str(&format!("{} = input[{}];\n", name, i));
                    self.cache.insert(n, name);
                }
                Op::Check { i, a, b, .. } => {
                    let a = self.operand(a);
                    let b = self.operand(b);
                    self.out.push_str(&format!("output[{}] = ({} \u{2212} {});\n", i, a, b));
                }
            }
        }
    }

    fn binary(&mut self, r: usize, a: usize, b: usize, op: &str) {
        let a = self.operand(a);
        let b = self.operand(b);
        self.assign(r, format!("({} {} {})", a, op, b));
    }

    /// The textual form of an already-computed record: its cached
    /// expression text, its name, its literal value, or (only if neither
    /// applies — not expected in a well-formed plan) its record index.
    fn operand(&mut self, idx: usize) -> String {
        if let Some(text) = self.cache.get(&idx) {
            return text.clone();
        }
        let rec = self.table.record(idx);
        let text = if rec.name != Symbol::EMPTY {
            self.interner.resolve(rec.name).to_string()
        } else if rec.is_literal {
            rec.value.to_string()
        } else {
            format!("@{}", idx)
        };
        self.cache.insert(idx, text.clone());
        text
    }

    /// Emits `name = value;` for a named record, matching §6's `d = s;`
    /// form; an anonymous record's value is cached for later operands to
    /// reference, with no statement of its own.
    fn assign(&mut self, r: usize, value: String) {
        let rec = self.table.record(r);
        if rec.name == Symbol::EMPTY {
            self.cache.insert(r, value);
        } else {
            let name = self.interner.resolve(rec.name).to_string();
            self.out.push_str(&format!("{} = {};\n", name, value));
            self.cache.insert(r, name);
        }
    }
}
