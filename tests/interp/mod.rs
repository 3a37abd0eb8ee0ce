//! Executes the C subset that the dispatch emitter produces.
//!
//! Supported statements: labels, `if (...) {` ... `}` with comparisons of the
//! codepoint variable joined by `&&`, `goto`, `return`, assignment followed by
//! `break`, and `static const` table declarations.

use std::collections::HashMap;

pub struct Program {
    stmts: Vec<Stmt>,
    labels: HashMap<String, usize>,
    tables: HashMap<String, Vec<u32>>,
}

pub struct Outcome {
    pub value: u32,
    /// Number of comparisons evaluated on the way to the result.
    pub comparisons: usize,
}

enum Stmt {
    If { conds: Vec<(Op, u32)>, end: usize },
    Goto(String),
    Return(Expr),
    Assign(Expr),
    Break,
    Nop,
}

#[derive(Copy, Clone)]
enum Op {
    Lt,
    Gt,
    Eq,
    Ge,
    Le,
}

enum Expr {
    Var,
    Add(i64),
    Or1,
    Const(u32),
    Index(String, u32),
}

fn hex(s: &str) -> u32 {
    let digits = s.strip_prefix("0x").unwrap_or_else(|| panic!("not hex: {}", s));
    u32::from_str_radix(digits, 16).unwrap()
}

impl Program {
    pub fn parse(code: &str, var: &str) -> Program {
        let mut program = Program {
            stmts: Vec::new(),
            labels: HashMap::new(),
            tables: HashMap::new(),
        };
        let mut open = Vec::new();
        let mut lines = code.lines().map(str::trim).filter(|line| !line.is_empty());

        while let Some(line) = lines.next() {
            if line.starts_with("//") {
                continue;
            }
            if let Some(rest) = line.strip_prefix("static const ") {
                let name = rest
                    .split_whitespace()
                    .nth(1)
                    .and_then(|name| name.strip_suffix("[]"))
                    .unwrap_or_else(|| panic!("bad table: {}", line))
                    .to_owned();
                let mut values = Vec::new();
                for line in lines.by_ref() {
                    if line == "};" {
                        break;
                    }
                    values.extend(
                        line.split(',')
                            .map(str::trim)
                            .filter(|value| !value.is_empty())
                            .map(hex),
                    );
                }
                program.tables.insert(name, values);
                continue;
            }

            let stmt = if let Some(label) = line.strip_suffix(':') {
                program.labels.insert(label.to_owned(), program.stmts.len());
                Stmt::Nop
            } else if let Some(cond) = line
                .strip_prefix("if (")
                .and_then(|line| line.strip_suffix(") {"))
            {
                open.push(program.stmts.len());
                let conds = cond.split(" && ").map(|c| parse_cond(c, var)).collect();
                Stmt::If { conds, end: 0 }
            } else if line == "}" {
                let start = open.pop().expect("unbalanced braces");
                let end = program.stmts.len();
                if let Stmt::If { end: slot, .. } = &mut program.stmts[start] {
                    *slot = end;
                }
                Stmt::Nop
            } else if let Some(label) = line.strip_prefix("goto ") {
                Stmt::Goto(label.trim_end_matches(';').to_owned())
            } else if let Some(expr) = line.strip_prefix("return ") {
                Stmt::Return(parse_expr(expr.trim_end_matches(';'), var))
            } else if line == "break;" {
                Stmt::Break
            } else if let Some((_, expr)) = line.split_once(" = ") {
                Stmt::Assign(parse_expr(expr.trim_end_matches(';'), var))
            } else {
                panic!("unsupported statement: {}", line);
            };
            program.stmts.push(stmt);
        }
        assert!(open.is_empty(), "unbalanced braces");
        program
    }

    pub fn run(&self, c: u32) -> Outcome {
        let mut pc = 0;
        let mut comparisons = 0;
        let mut assigned = None;
        for _ in 0..100_000 {
            match &self.stmts[pc] {
                Stmt::If { conds, end } => {
                    let mut taken = true;
                    for &(op, rhs) in conds {
                        comparisons += 1;
                        let holds = match op {
                            Op::Lt => c < rhs,
                            Op::Gt => c > rhs,
                            Op::Eq => c == rhs,
                            Op::Ge => c >= rhs,
                            Op::Le => c <= rhs,
                        };
                        if !holds {
                            taken = false;
                            break;
                        }
                    }
                    pc = if taken { pc + 1 } else { end + 1 };
                }
                Stmt::Goto(label) => pc = self.labels[label],
                Stmt::Return(expr) => {
                    return Outcome {
                        value: self.eval(expr, c),
                        comparisons,
                    }
                }
                Stmt::Assign(expr) => {
                    assigned = Some(self.eval(expr, c));
                    pc += 1;
                }
                Stmt::Break => {
                    return Outcome {
                        value: assigned.expect("break before assignment"),
                        comparisons,
                    }
                }
                Stmt::Nop => pc += 1,
            }
        }
        panic!("U+{:04X}: no result after 100000 steps", c);
    }

    pub fn fold(&self, c: u32) -> u32 {
        self.run(c).value
    }

    fn eval(&self, expr: &Expr, c: u32) -> u32 {
        match expr {
            Expr::Var => c,
            Expr::Add(delta) => (i64::from(c) + delta) as u32,
            Expr::Or1 => c | 1,
            Expr::Const(value) => *value,
            Expr::Index(table, base) => self.tables[table][(c - base) as usize],
        }
    }
}

fn parse_cond(cond: &str, var: &str) -> (Op, u32) {
    let mut parts = cond.split_whitespace();
    assert_eq!(parts.next(), Some(var), "{}", cond);
    let op = match parts.next() {
        Some("<") => Op::Lt,
        Some(">") => Op::Gt,
        Some("==") => Op::Eq,
        Some(">=") => Op::Ge,
        Some("<=") => Op::Le,
        other => panic!("unsupported operator {:?} in {}", other, cond),
    };
    (op, hex(parts.next().unwrap()))
}

fn parse_expr(expr: &str, var: &str) -> Expr {
    if expr == var {
        return Expr::Var;
    }
    if expr.starts_with("0x") {
        return Expr::Const(hex(expr));
    }
    if let Some(rest) = expr.strip_prefix(var) {
        let rest = rest.trim();
        if rest == "| 1" {
            return Expr::Or1;
        }
        if let Some(n) = rest.strip_prefix("+ ") {
            return Expr::Add(n.parse().unwrap());
        }
        if let Some(n) = rest.strip_prefix("- ") {
            return Expr::Add(-n.parse::<i64>().unwrap());
        }
    }
    if let Some((table, index)) = expr.strip_suffix(']').and_then(|e| e.split_once('[')) {
        let base = index
            .strip_prefix(var)
            .and_then(|rest| rest.trim().strip_prefix("- "))
            .unwrap_or_else(|| panic!("unsupported index: {}", expr));
        return Expr::Index(table.to_owned(), hex(base));
    }
    panic!("unsupported expression: {}", expr);
}
