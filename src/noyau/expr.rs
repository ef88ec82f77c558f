// src/noyau/expr.rs
//
// AST exact, immuable une fois construit.
// - Nombre : littéral rationnel (lu exactement)
// - Var    : référence à l’environnement (pas de repli sur des constantes)
// - Appel  : fonction du registre + arguments ordonnés
// - Binaire / Unaire
//
// Display produit un texte entièrement parenthésé, relisible par l’analyse
// avec la même valeur (aller-retour).

use num_rational::BigRational;
use num_traits::Signed;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl OpBinaire {
    pub fn depuis_char(c: char) -> Option<Self> {
        Some(match c {
            '+' => OpBinaire::Add,
            '-' => OpBinaire::Sub,
            '*' => OpBinaire::Mul,
            '/' => OpBinaire::Div,
            '%' => OpBinaire::Mod,
            '^' => OpBinaire::Pow,
            _ => return None,
        })
    }

    pub fn symbole(self) -> char {
        match self {
            OpBinaire::Add => '+',
            OpBinaire::Sub => '-',
            OpBinaire::Mul => '*',
            OpBinaire::Div => '/',
            OpBinaire::Mod => '%',
            OpBinaire::Pow => '^',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Neg,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Nombre(BigRational),
    Var(String),
    Appel(String, Vec<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),
    Unaire(OpUnaire, Box<Expr>),
}

impl Expr {
    pub fn binaire(op: OpBinaire, a: Expr, b: Expr) -> Expr {
        Expr::Binaire(op, Box::new(a), Box::new(b))
    }

    pub fn neg(x: Expr) -> Expr {
        Expr::Unaire(OpUnaire::Neg, Box::new(x))
    }

    /// Vrai si l’arbre ne contient que des littéraux et des opérateurs.
    pub fn est_litteral(&self) -> bool {
        match self {
            Expr::Nombre(_) => true,
            Expr::Var(_) | Expr::Appel(_, _) => false,
            Expr::Binaire(_, a, b) => a.est_litteral() && b.est_litteral(),
            Expr::Unaire(_, x) => x.est_litteral(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nombre(r) => {
                let n = r.numer();
                let d = r.denom();
                match (r.is_integer(), n.is_negative()) {
                    (true, false) => write!(f, "{n}"),
                    (true, true) => write!(f, "(-{})", n.abs()),
                    (false, false) => write!(f, "({n}/{d})"),
                    (false, true) => write!(f, "(-{}/{d})", n.abs()),
                }
            }
            Expr::Var(s) => write!(f, "{s}"),
            Expr::Appel(nom, args) => {
                write!(f, "{nom}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Expr::Binaire(op, a, b) => write!(f, "({a}{}{b})", op.symbole()),
            Expr::Unaire(OpUnaire::Neg, x) => write!(f, "(-{x})"),
        }
    }
}
