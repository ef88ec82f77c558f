// src/noyau/format.rs
//
// Affichage d’un résultat rationnel :
// - EXACT : fraction réduite ou entier ("1/3", "42", "-7/2")
// - lecture décimale tronquée (sans flottant)
// - lecture flottante (avec perte), via le trait RationnelExt

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

use super::rationnel::vers_f64;

/// Forme exacte : "n" si entier, sinon "n/d" (signe porté par n).
pub fn texte_exact(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    num_traits::pow(BigInt::from(10), n)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal tronqué.
fn scaled_to_decimal(scaled: BigInt, digits: usize, neg: bool) -> String {
    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;
    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }
    format!("{signe}{int_part}.{frac}")
}

/// Lecture décimale tronquée à `digits` décimales : 1/3 -> "0.333", -1/3 -> "-0.333".
/// Une valeur qui tronque à zéro n’affiche pas de signe.
pub fn format_decimal(r: &BigRational, digits: usize) -> String {
    // |r| * 10^digits, tronqué
    let scaled = (r.numer().abs() * pow10(digits)) / r.denom();
    let neg = r.is_negative() && scaled != BigInt::from(0);
    scaled_to_decimal(scaled, digits, neg)
}

/* ------------------------ Trait d’affichage ------------------------ */

/// Vues d’un résultat pour les appelants (calculatrice, tracé).
pub trait RationnelExt {
    /// (valeur, représentable) : `false` si aucune image finie en f64.
    fn vers_flottant(&self) -> (f64, bool);
    /// Forme exacte réduite.
    fn texte_exact(&self) -> String;
}

impl RationnelExt for BigRational {
    fn vers_flottant(&self) -> (f64, bool) {
        vers_f64(self)
    }

    fn texte_exact(&self) -> String {
        texte_exact(self)
    }
}
