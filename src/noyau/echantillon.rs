// src/noyau/echantillon.rs
//
// Adaptateur d’échantillonnage pour le tracé / la recherche d’inverse.
// - Courbe : texte analysé UNE fois (via le cache du moteur), puis évalué en x
// - en(x)  : None = “pas d’échantillon ici” (toute erreur, ou valeur non finie en f64)
// - inverse(y) : bisection bornée (100 itérations), suppose f croissante sur [min, max]
//
// Le moteur reste opaque : seules les entrées publiques sont utilisées.

use std::sync::Arc;

use num_rational::BigRational;

use super::erreur::ErreurEval;
use super::eval::{constantes, moteur_global, Environnement, Evaluateur};
use super::expr::Expr;
use super::rationnel::{depuis_f64, vers_f64};

/// Nombre maximal d’itérations de la bisection.
pub const ITERATIONS_MAX: usize = 100;

pub struct Courbe {
    ast: Arc<Expr>,
    base: Environnement,
}

impl Courbe {
    /// Analyse le texte (variable libre : `x`, constantes : `pi`, `e`).
    pub fn new(texte: &str) -> Result<Self, ErreurEval> {
        Ok(Self {
            ast: moteur_global().compiler(texte)?,
            base: constantes(),
        })
    }

    /// Valeur exacte (ou erreur typée) en un x rationnel.
    pub fn valeur(&self, x: BigRational) -> Result<BigRational, ErreurEval> {
        let env = self.base.clone().avec("x", x);
        Evaluateur::new(&env, moteur_global().registre()).evaluer(&self.ast)
    }

    /// Échantillon flottant en x ; None si indéfini ici.
    pub fn en(&self, x: f64) -> Option<f64> {
        let xr = depuis_f64(x)?;
        match self.valeur(xr) {
            Ok(v) => {
                let (f, ok) = vers_f64(&v);
                ok.then_some(f)
            }
            Err(e) => {
                tracing::trace!(x, erreur = %e, "pas d’échantillon");
                None
            }
        }
    }

    /// `n` points régulièrement espacés sur [min, max] (bornes incluses).
    pub fn points(&self, min: f64, max: f64, n: usize) -> Vec<(f64, Option<f64>)> {
        match n {
            0 => Vec::new(),
            1 => vec![(min, self.en(min))],
            _ => {
                let pas = (max - min) / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let x = min + pas * i as f64;
                        (x, self.en(x))
                    })
                    .collect()
            }
        }
    }

    /// x tel que |f(x) - y| < tol, par bisection sur [min, max].
    /// None si un échantillon manque en cours de route ou sans convergence.
    pub fn inverse(&self, y: f64, mut min: f64, mut max: f64, tol: f64) -> Option<f64> {
        for _ in 0..ITERATIONS_MAX {
            let mid = (min + max) / 2.0;
            let fmid = self.en(mid)?;
            if (fmid - y).abs() < tol {
                return Some(mid);
            }
            if fmid < y {
                min = mid;
            } else {
                max = mid;
            }
        }
        None
    }
}
