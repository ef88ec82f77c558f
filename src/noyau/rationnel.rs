// src/noyau/rationnel.rs
//
// Noyau rationnel exact (sans flottants, sauf aux deux frontières explicites
// depuis_f64 / vers_f64).
// - arrondis floor/ceil, min/max, reste tronqué
// - factorielle, pgcd (entiers seulement, sinon None => erreur de domaine)
// - puissance entière exacte (coût borné par la taille estimée du résultat)
// - lecture m·2^k pour ln / log / sqrt d’arguments hors de portée des f64
// - lecture exacte des littéraux décimaux ("1.25e-3")
// - constantes π, e en approximation rationnelle (séries entières scalées)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::sync::OnceLock;

/// Nombre de décimales exactes de π et e fournis comme constantes.
pub const PRECISION_CONSTANTES: usize = 40;

/// Garde-fou : taille maximale (en bits, estimée) d’un résultat x^n exact.
pub const BITS_PUISSANCE_MAX: u64 = 1_000_000;

/// Garde-fou : argument maximal de fact().
pub const FACTORIELLE_MAX: u64 = 10_000;

/// Garde-fou : |exposant| maximal dans un littéral ("1e10000").
const EXPOSANT_LITTERAL_MAX: i64 = 10_000;

fn pow10(n: usize) -> BigInt {
    num_traits::pow(BigInt::from(10), n)
}

/* ------------------------ Arrondis / comparaisons ------------------------ */

/// Arrondi vers −∞ : floor(-3/2) = -2.
pub fn plancher(r: &BigRational) -> BigRational {
    r.floor()
}

/// Arrondi vers +∞ : ceil(-3/2) = -1.
pub fn plafond(r: &BigRational) -> BigRational {
    r.ceil()
}

pub fn maximum(a: &BigRational, b: &BigRational) -> BigRational {
    if a >= b {
        a.clone()
    } else {
        b.clone()
    }
}

pub fn minimum(a: &BigRational, b: &BigRational) -> BigRational {
    if a <= b {
        a.clone()
    } else {
        b.clone()
    }
}

/// Reste tronqué : a - b*trunc(a/b). Le signe suit le dividende.
/// None si b = 0.
pub fn reste(a: &BigRational, b: &BigRational) -> Option<BigRational> {
    if b.is_zero() {
        return None;
    }
    let q = (a / b).trunc();
    Some(a - b * q)
}

/* ------------------------ Entiers ------------------------ */

/// Entier porté par un rationnel de dénominateur 1.
pub fn comme_entier(r: &BigRational) -> Option<&BigInt> {
    if r.is_integer() {
        Some(r.numer())
    } else {
        None
    }
}

/// n! pour n entier dans [0, FACTORIELLE_MAX]. Sinon None.
pub fn factorielle(r: &BigRational) -> Option<BigRational> {
    let n = comme_entier(r)?;
    if n.is_negative() {
        return None;
    }
    let n = n.to_u64().filter(|n| *n <= FACTORIELLE_MAX)?;

    let mut acc = BigInt::one();
    for k in 2..=n {
        acc *= k;
    }
    Some(BigRational::from_integer(acc))
}

/// pgcd de deux rationnels entiers (résultat ≥ 0, pgcd(0,0) = 0). Sinon None.
pub fn pgcd(a: &BigRational, b: &BigRational) -> Option<BigRational> {
    let mut x = comme_entier(a)?.abs();
    let mut y = comme_entier(b)?.abs();
    while !y.is_zero() {
        let r = &x % &y;
        x = y;
        y = r;
    }
    Some(BigRational::from_integer(x))
}

/* ------------------------ Puissance entière ------------------------ */

/// base^exp exact. Numérateur et dénominateur élevés séparément :
/// une fraction réduite le reste, aucun pgcd à recalculer.
/// Bases 0, 1, -1 : réponse directe, quel que soit l’exposant.
/// None si base = 0 avec exposant négatif, ou résultat estimé au-delà
/// de BITS_PUISSANCE_MAX.
pub fn puissance_entiere(base: &BigRational, exp: &BigInt) -> Option<BigRational> {
    if exp.is_zero() {
        return Some(BigRational::one());
    }
    if base.is_zero() {
        return (!exp.is_negative()).then(BigRational::zero);
    }
    if base.numer().abs().is_one() && base.denom().is_one() {
        let pair = (exp % 2u32).is_zero();
        return Some(if pair { BigRational::one() } else { base.clone() });
    }

    let k = exp.magnitude().to_u64()?;
    let bits = base.numer().bits().max(base.denom().bits());
    bits.checked_mul(k).filter(|b| *b <= BITS_PUISSANCE_MAX)?;

    let k = usize::try_from(k).ok()?;
    let r = BigRational::new_raw(
        num_traits::pow(base.numer().clone(), k),
        num_traits::pow(base.denom().clone(), k),
    );
    // recip : remet le signe au numérateur, sans réduction
    Some(if exp.is_negative() { r.recip() } else { r })
}

/// r·2^k exact.
fn decaler(r: BigRational, k: i64) -> BigRational {
    let p = BigRational::from_integer(BigInt::one() << k.unsigned_abs() as usize);
    if k >= 0 {
        r * p
    } else {
        r / p
    }
}

/* ------------------------ Lecture m·2^k ------------------------ */

/// r > 0 écrit m·2^k avec m dans ]1/2, 2[ : (m, k).
/// Toujours lisible en f64, même quand r ne l’est pas (10^400, 10^-400).
pub fn mantisse_exposant(r: &BigRational) -> Option<(f64, i64)> {
    if !r.is_positive() {
        return None;
    }
    let k = r.numer().bits() as i64 - r.denom().bits() as i64;
    let decale = k.unsigned_abs() as usize;
    let m = if k >= 0 {
        BigRational::new_raw(r.numer().clone(), r.denom() << decale)
    } else {
        BigRational::new_raw(r.numer() << decale, r.denom().clone())
    };
    let (m, ok) = vers_f64(&m);
    ok.then_some((m, k))
}

/// ln(r) en f64 ; None si r <= 0.
pub fn ln_approche(r: &BigRational) -> Option<f64> {
    let (m, k) = mantisse_exposant(r)?;
    Some(m.ln() + k as f64 * std::f64::consts::LN_2)
}

/// log10(r) en f64 ; None si r <= 0.
pub fn log10_approche(r: &BigRational) -> Option<f64> {
    let (m, k) = mantisse_exposant(r)?;
    Some(m.log10() + k as f64 * std::f64::consts::LOG10_2)
}

/// √r approchée (f64 sur la mantisse, puissance de 2 exacte) ; None si r < 0.
pub fn racine_approchee(r: &BigRational) -> Option<BigRational> {
    if r.is_zero() {
        return Some(BigRational::zero());
    }
    let (mut m, mut k) = mantisse_exposant(r)?;
    if k % 2 != 0 {
        m *= 2.0;
        k -= 1;
    }
    Some(decaler(depuis_f64(m.sqrt())?, k / 2))
}

/* ------------------------ Racine exacte ------------------------ */

/// √r si numérateur et dénominateur sont des carrés parfaits.
pub fn racine_exacte(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = racine_entiere_exacte(r.numer())?;
    let sd = racine_entiere_exacte(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn racine_entiere_exacte(x: &BigInt) -> Option<BigInt> {
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}

/* ------------------------ Frontière flottante ------------------------ */

/// Conversion EXACTE d’un f64 fini en rationnel. None pour NaN / ±∞.
pub fn depuis_f64(f: f64) -> Option<BigRational> {
    if !f.is_finite() {
        return None;
    }
    BigRational::from_float(f)
}

/// Lecture flottante (avec perte). `false` si la valeur n’a pas d’image finie en f64.
pub fn vers_f64(r: &BigRational) -> (f64, bool) {
    match r.to_f64() {
        Some(f) if f.is_finite() => (f, true),
        Some(f) => (f, false),
        None => (f64::NAN, false),
    }
}

/* ------------------------ Littéraux décimaux ------------------------ */

/// "12", "1.25", ".5", "3e-2", "6.02E23" -> rationnel exact.
/// Le texte vient du tokenizer (forme déjà validée) ; None si illisible
/// ou exposant hors garde-fou.
pub fn depuis_litteral(texte: &str) -> Option<BigRational> {
    let (mantisse, exposant) = match texte.find(['e', 'E']) {
        Some(i) => (&texte[..i], texte[i + 1..].parse::<i64>().ok()?),
        None => (texte, 0),
    };
    if exposant.unsigned_abs() > EXPOSANT_LITTERAL_MAX as u64 {
        return None;
    }

    let (entiere, fraction) = match mantisse.split_once('.') {
        Some((a, b)) => (a, b),
        None => (mantisse, ""),
    };
    let chiffres = format!("{entiere}{fraction}");
    if chiffres.is_empty() {
        return None;
    }
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;

    let decalage = exposant - fraction.len() as i64;
    let echelle = pow10(decalage.unsigned_abs() as usize);
    if decalage >= 0 {
        Some(BigRational::from_integer(n * echelle))
    } else {
        Some(BigRational::new(n, echelle))
    }
}

/* ------------------------ π (Machin) et e ------------------------ */

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);

    let mut k: i64 = 0;
    let mut q_pow = q.clone();
    let mut sum = BigInt::zero();

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }
        if k % 2 == 0 {
            sum += &term;
        } else {
            sum -= &term;
        }
        q_pow *= &q;
        q_pow *= &q;
        k += 1;
    }

    sum
}

fn pi_rationnel(digits: usize) -> BigRational {
    // extra pour amortir les erreurs de troncature
    let extra = 10usize;
    let scale = pow10(digits + extra);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);
    let pi = (BigInt::from(16) * a - BigInt::from(4) * b) / pow10(extra);

    BigRational::new(pi, pow10(digits))
}

fn e_rationnel(digits: usize) -> BigRational {
    // e = Σ 1/k!  (termes scalés, tronqués)
    let extra = 10usize;
    let scale = pow10(digits + extra);

    let mut sum = BigInt::zero();
    let mut term = scale;
    let mut k: u64 = 1;
    while !term.is_zero() {
        sum += &term;
        term /= k;
        k += 1;
    }

    BigRational::new(sum / pow10(extra), pow10(digits))
}

static PI: OnceLock<BigRational> = OnceLock::new();
static E: OnceLock<BigRational> = OnceLock::new();

/// π à PRECISION_CONSTANTES décimales (calculé une fois).
pub fn pi() -> &'static BigRational {
    PI.get_or_init(|| pi_rationnel(PRECISION_CONSTANTES))
}

/// e à PRECISION_CONSTANTES décimales (calculé une fois).
pub fn e() -> &'static BigRational {
    E.get_or_init(|| e_rationnel(PRECISION_CONSTANTES))
}
