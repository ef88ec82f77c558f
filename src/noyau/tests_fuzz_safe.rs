//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : jamais de panique, et une erreur est toujours typée
//! - invariant clé : réécrire l’AST puis réévaluer donne la même valeur

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;

use super::analyse::parse;
use super::erreur::ErreurEval;
use super::eval::{execute, Environnement, Moteur};
use super::fonctions::registre_global;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn env_x() -> Environnement {
    Environnement::new().avec("x", BigRational::new(BigInt::from(7), BigInt::from(3)))
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const FONCTIONS: [&str; 12] = [
    "abs", "floor", "ceil", "sin", "cos", "sqrt", "ln", "max", "min", "gcd", "fact", "csc",
];

fn gen_nombre(rng: &mut Rng) -> String {
    let a = rng.pick(10);
    match rng.pick(4) {
        0 => format!("{a}.{}", rng.pick(100)),
        1 => format!("{a}e-{}", rng.pick(3)),
        _ => format!("{a}"),
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(8) {
        0..=3 => gen_nombre(rng),
        4 | 5 => "x".to_string(),
        6 => "pi".to_string(),
        // variable absente : erreur attendue
        _ => "y".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(10) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => format!("({}-{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}*{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}/{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        5 => format!("({}%{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        6 => format!("({})^{}", gen_expr(rng, depth - 1), rng.pick(4)),
        7 => format!("-{}", gen_expr(rng, depth - 1)),
        _ => {
            // fonction avec 0..=3 arguments : arité parfois fausse (volontaire)
            let f = FONCTIONS[rng.pick(FONCTIONS.len() as u32) as usize];
            let n = rng.pick(4);
            let args: Vec<String> = (0..n).map(|_| gen_expr(rng, depth - 1)).collect();
            format!("{f}({})", args.join(", "))
        }
    }
}

/// Texte bruité : caractères pris dans un alphabet qui inclut de l’invalide.
fn gen_bruit(rng: &mut Rng, longueur: usize) -> String {
    const ALPHABET: &[char] = &[
        '1', '2', '.', 'e', 'x', '+', '-', '*', '/', '^', '%', '(', ')', ',', ' ', 's', 'i',
        'n', '$', 'π',
    ];
    (0..longueur)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

/// n copies de `terme` sommées en arbre équilibré (profondeur ~ log2 n).
fn somme_balancee(terme: &str, n: usize) -> String {
    let mut niveau: Vec<String> = vec![terme.to_string(); n];
    while niveau.len() > 1 {
        niveau = niveau
            .chunks(2)
            .map(|paire| match paire {
                [a, b] => format!("({a}+{b})"),
                [seul] => seul.clone(),
                _ => unreachable!(),
            })
            .collect();
    }
    niveau.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_reecriture() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let env = env_x();

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let r1 = execute(&expr, &env);
        let r2 = execute(&expr, &env);
        assert_eq!(r1, r2, "non déterministe: expr={expr:?}");

        // réécriture de l’AST : même valeur (ou même erreur)
        let ast = parse(&expr).unwrap_or_else(|e| panic!("expr générée invalide {expr:?}: {e}"));
        let reecrit = ast.to_string();
        assert_eq!(execute(&reecrit, &env), r1, "expr={expr:?} reecrit={reecrit:?}");

        match r1 {
            Ok(_) => seen_ok += 1,
            Err(e) => {
                // jamais d’erreur de forme sur une expression générée valide
                assert!(
                    !matches!(e, ErreurEval::Lexicale { .. } | ErreurEval::Syntaxe { .. }),
                    "erreur inattendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 5, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    let mut rng = Rng::new(0xBADC0DE_u64);
    let env = env_x();

    for _ in 0..400 {
        budget(t0, max);

        let longueur = 1 + rng.pick(24) as usize;
        let texte = gen_bruit(&mut rng, longueur);

        // seul contrat : un résultat ou une erreur typée, sans panique
        if let Err(ErreurEval::Lexicale { position, caractere }) = execute(&texte, &env) {
            assert_eq!(texte.chars().nth(position), Some(caractere), "texte={texte:?}");
        }
    }
}

#[test]
fn fuzz_safe_cache_coherent() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    // un moteur neuf (cache vide) et le moteur global donnent les mêmes résultats
    let moteur = Moteur::new(registre_global());
    let mut rng = Rng::new(0x5EED_u64);
    let env = super::eval::constantes().superpose(&env_x());

    for _ in 0..60 {
        budget(t0, max);
        let expr = gen_expr(&mut rng, 3);
        let a = moteur.evaluer_avec(&expr, &env);
        let b = moteur.evaluer_avec(&expr, &env);
        assert_eq!(a, b);
        assert_eq!(a, execute(&expr, &env_x()), "expr={expr:?}");
        if rng.coin() {
            moteur.vider_cache();
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let v = execute(&expr, &Environnement::new()).unwrap_or_else(|e| panic!("err: {e}"));

    // 800*(1/2) = 400
    assert_eq!(v, BigRational::from_integer(BigInt::from(400)));
}
