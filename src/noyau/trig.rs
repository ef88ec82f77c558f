// src/noyau/trig.rs
//
// Trigonométrie approchée (f64) pour sin/cos/tan et réciproques csc/sec/cot
// ------------------------------------------------------------------------
// - Entrée rationnelle convertie en f64 (perte assumée, classe "approchée")
// - Second argument présent => angle en degrés (sa valeur est ignorée)
// - Réciproques : pôle si |dénominateur| < EPSILON_POLE => None (erreur de domaine)
// - Sortie reconvertie exactement depuis le f64 ; NaN/∞ => None

use num_rational::BigRational;

use super::rationnel::{depuis_f64, vers_f64};

/// Seuil de pôle pour csc/sec/cot.
pub const EPSILON_POLE: f64 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
    Csc,
    Sec,
    Cot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigInv {
    Asin,
    Acos,
    Atan,
}

fn en_radians(x: f64, en_degres: bool) -> f64 {
    if en_degres {
        x.to_radians()
    } else {
        x
    }
}

/// Valeur flottante de f(x). None sur un pôle ou hors image finie.
pub fn trig_f64(f: TrigFn, x: f64, en_degres: bool) -> Option<f64> {
    let a = en_radians(x, en_degres);

    let reciproque = |den: f64, num: f64| {
        if den.abs() < EPSILON_POLE {
            None
        } else {
            Some(num / den)
        }
    };

    let v = match f {
        TrigFn::Sin => a.sin(),
        TrigFn::Cos => a.cos(),
        TrigFn::Tan => a.tan(),
        TrigFn::Csc => reciproque(a.sin(), 1.0)?,
        TrigFn::Sec => reciproque(a.cos(), 1.0)?,
        // cot = cos/sin : le pôle est sur sin, pas sur tan
        TrigFn::Cot => reciproque(a.sin(), a.cos())?,
    };

    v.is_finite().then_some(v)
}

/// Rappel du registre pour la famille trig (arité 1..=2).
pub fn trig(f: TrigFn, args: &[BigRational]) -> Option<BigRational> {
    let (x, ok) = vers_f64(args.first()?);
    if !ok {
        return None;
    }
    depuis_f64(trig_f64(f, x, args.len() == 2)?)
}

/// Réciproques (radians en sortie). Hors [-1, 1] pour asin/acos => None.
pub fn trig_inverse(f: TrigInv, args: &[BigRational]) -> Option<BigRational> {
    let (x, ok) = vers_f64(args.first()?);
    if !ok {
        return None;
    }
    let v = match f {
        TrigInv::Asin => x.asin(),
        TrigInv::Acos => x.acos(),
        TrigInv::Atan => x.atan(),
    };
    depuis_f64(v)
}
