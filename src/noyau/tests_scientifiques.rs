//! Tests scientifiques (campagne) : propriétés attendues du noyau.
//!
//! - exactitude des rationnels (forme réduite)
//! - précédences et associativités, dont la convention moins unaire / ^
//! - arité, division par zéro, domaines : toujours une erreur typée
//! - masquage des constantes par l’appelant
//! - déterminisme (hors rand)
//! - aller-retour texte -> AST -> texte -> valeur sur des arbres littéraux

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::analyse::parse;
use super::erreur::ErreurEval;
use super::eval::{evaluate, execute, Environnement};
use super::format::{texte_exact, RationnelExt};
use super::rationnel;

fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn exact(expr: &str) -> String {
    let v = evaluate(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    texte_exact(&v)
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    assert_eq!(exact(expr), attendu, "expr={expr:?}");
}

fn approx(expr: &str) -> f64 {
    let v = evaluate(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    let (f, ok) = v.vers_flottant();
    assert!(ok, "non représentable: {expr:?}");
    f
}

fn assert_domaine(expr: &str, fonction: &str) {
    match evaluate(expr) {
        Err(ErreurEval::Domaine { fonction: f, .. }) => assert_eq!(f, fonction, "expr={expr:?}"),
        autre => panic!("expr={expr:?} : erreur de domaine attendue, obtenu {autre:?}"),
    }
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Exactitude ------------------------ */

#[test]
fn sci_fractions_reduites() {
    assert_exact_eq("4/8", "1/2");
    assert_exact_eq("-6/4", "-3/2");
    assert_exact_eq("6/-4", "-3/2");
    assert_exact_eq("10/5", "2");
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("1/3 + 1/3 + 1/3", "1");
}

#[test]
fn sci_litteraux_decimaux_exacts() {
    assert_exact_eq("0.1 + 0.2", "3/10");
    assert_exact_eq("1.5e2", "150");
    assert_exact_eq("2.5e-1", "1/4");
}

/* ------------------------ Précédences ------------------------ */

#[test]
fn sci_precedences() {
    assert_exact_eq("2+3*4", "14");
    assert_exact_eq("(2+3)*4", "20");
    assert_exact_eq("2^3^2", "512");
    assert_exact_eq("(2^3)^2", "64");
    assert_exact_eq("10-4-3", "3");
    assert_exact_eq("2*3%4", "2");
}

#[test]
fn sci_moins_unaire_et_puissance() {
    // convention : - unaire plus faible que ^
    assert_exact_eq("-2^2", "-4");
    assert_exact_eq("(-2)^2", "4");
    assert_exact_eq("-2^3", "-8");
    assert_exact_eq("2^-2", "1/4");
    assert_exact_eq("-(-3)", "3");
    assert_exact_eq("2*-3", "-6");
}

/* ------------------------ Arrondis ------------------------ */

#[test]
fn sci_floor_ceil_negatifs() {
    assert_exact_eq("floor(-3/2)", "-2");
    assert_exact_eq("ceil(-3/2)", "-1");
    assert_exact_eq("floor(7/2)", "3");
    assert_exact_eq("ceil(7/2)", "4");
    assert_exact_eq("floor(-4)", "-4");
}

/* ------------------------ Arité ------------------------ */

#[test]
fn sci_arite() {
    assert!(matches!(
        evaluate("max(1)"),
        Err(ErreurEval::Arite { ref nom, recu: 1, .. }) if nom == "max"
    ));
    assert!(matches!(
        evaluate("sin(1, 2, 3)"),
        Err(ErreurEval::Arite { recu: 3, .. })
    ));
    assert!(matches!(
        evaluate("rand(1)"),
        Err(ErreurEval::Arite { recu: 1, .. })
    ));
    assert!(matches!(
        evaluate("sin()"),
        Err(ErreurEval::Arite { recu: 0, .. })
    ));
    // 1 et 2 arguments acceptés
    approx("sin(1)");
    approx("sin(90, 1)");
}

/* ------------------------ Division par zéro / domaines ------------------------ */

#[test]
fn sci_division_par_zero() {
    assert_eq!(evaluate("1/0"), Err(ErreurEval::DivisionParZero));
    assert_eq!(evaluate("1/(2-2)"), Err(ErreurEval::DivisionParZero));
    assert_eq!(evaluate("0^-2"), Err(ErreurEval::DivisionParZero));
    assert_eq!(evaluate("3 % 0"), Err(ErreurEval::DivisionParZero));
}

#[test]
fn sci_domaines() {
    assert_domaine("fact(-1)", "fact");
    assert_domaine("fact(1/2)", "fact");
    assert_domaine("ln(0)", "ln");
    assert_domaine("log(-1)", "log");
    assert_domaine("sqrt(-4)", "sqrt");
    assert_domaine("asin(2)", "asin");
    assert_domaine("gcd(1/2, 3)", "gcd");
    assert_domaine("csc(0)", "csc");
    assert_domaine("cot(0)", "cot");
    assert_domaine("sec(90, 1)", "sec");
}

/* ------------------------ Fonctions exactes ------------------------ */

#[test]
fn sci_fonctions_exactes() {
    assert_exact_eq("fact(5)", "120");
    assert_exact_eq("fact(0)", "1");
    assert_exact_eq("gcd(12, 18)", "6");
    assert_exact_eq("gcd(-4, 6)", "2");
    assert_exact_eq("max(1/3, 1/2)", "1/2");
    assert_exact_eq("min(-1/3, -1/2)", "-1/2");
    assert_exact_eq("abs(-7/3)", "7/3");
    assert_exact_eq("sqrt(9/4)", "3/2");
}

#[test]
fn sci_fonctions_approchees() {
    assert!((approx("sqrt(2)") - std::f64::consts::SQRT_2).abs() < 1e-15);
    assert!((approx("sin(30, 1)") - 0.5).abs() < 1e-12);
    assert!((approx("cos(pi)") + 1.0).abs() < 1e-12);
    assert!((approx("log(1000)") - 3.0).abs() < 1e-12);
    assert!((approx("ln(e)") - 1.0).abs() < 1e-12);
    assert!((approx("logn(2, 8)") - 3.0).abs() < 1e-12);
    assert!((approx("rad2deg(pi)") - 180.0).abs() < 1e-9);
    assert!((approx("deg2rad(180)") - std::f64::consts::PI).abs() < 1e-12);
    assert!((approx("atan(1)*4") - std::f64::consts::PI).abs() < 1e-12);
}

/* ------------------------ Masquage ------------------------ */

#[test]
fn sci_masquage_constantes() {
    let env = Environnement::new().avec("x", q(5, 1));
    assert_eq!(execute("x+1", &env).unwrap(), q(6, 1));

    assert_eq!(execute("pi", &Environnement::new()).unwrap(), *rationnel::pi());

    let env = Environnement::new().avec("e", q(2, 1));
    assert_eq!(execute("e^2", &env).unwrap(), q(4, 1));
    // evaluate ignore tout environnement d’appelant
    assert_ne!(evaluate("e").unwrap(), q(2, 1));
}

/* ------------------------ Déterminisme ------------------------ */

#[test]
fn sci_determinisme_hors_rand() {
    let exprs = [
        "sin(1/3) + cos(2)",
        "fact(20) / 3^7",
        "sqrt(2) * pi",
        "2^0.5 + logn(3, 10)",
    ];
    for e in exprs {
        assert_eq!(evaluate(e), evaluate(e), "expr={e:?}");
    }
}

#[test]
fn sci_rand_exempte() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // 20 tirages : au moins deux différents (probabilité d’échec négligeable)
    let tirages: Vec<_> = (0..20)
        .map(|_| {
            budget(t0, max);
            evaluate("rand()").unwrap()
        })
        .collect();
    assert!(tirages.iter().any(|t| t != &tirages[0]));
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let expr = format!("({big} + 1)/7 - {big}/7");
    budget(t0, max);
    assert_exact_eq(&expr, "1/7");

    assert_eq!(exact("2^200").len(), 61);
    budget(t0, max);
}

/* ------------------------ Aller-retour ------------------------ */

fn arbre_litteral() -> impl Strategy<Value = String> {
    let feuille = (-50i64..50, 1i64..20).prop_map(|(n, d)| {
        if d == 1 {
            format!("{n}")
        } else {
            format!("{n}/{d}")
        }
    });
    feuille.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})+({b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})-({b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})*({b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})/({b})")),
            inner.clone().prop_map(|a| format!("-({a})")),
            (inner, 0i64..4).prop_map(|(a, k)| format!("({a})^{k}")),
        ]
    })
}

proptest! {
    #[test]
    fn aller_retour_litteral(texte in arbre_litteral()) {
        let ast = parse(&texte).unwrap();
        prop_assert!(ast.est_litteral());

        let reecrit = ast.to_string();
        prop_assert_eq!(parse(&reecrit).unwrap(), ast);
        prop_assert_eq!(evaluate(&reecrit), evaluate(&texte));
    }

    #[test]
    fn division_exacte(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        prop_assume!(b != 0);
        let v = evaluate(&format!("{a}/{b}")).unwrap();
        prop_assert_eq!(v, q(a, b));
    }

    #[test]
    fn floor_ceil_encadrent(n in -1000i64..1000, d in 1i64..50) {
        let x = q(n, d);
        let env = Environnement::new().avec("x", x.clone());
        let f = execute("floor(x)", &env).unwrap();
        let c = execute("ceil(x)", &env).unwrap();
        prop_assert!(f <= x && x <= c);
        prop_assert!(&c - &f <= q(1, 1));
        prop_assert!(f.is_integer() && c.is_integer());
    }
}
