//! Noyau exact Q-pur
//!
//! Organisation interne :
//! - jetons.rs      : tokenisation (positions en caractères)
//! - analyse.rs     : descente récursive -> Expr
//! - expr.rs        : AST immuable + affichage relisible
//! - rationnel.rs   : arithmétique exacte (floor/ceil, pgcd, fact, puissances, π, e)
//! - trig.rs        : trig approchée + pôles des réciproques
//! - fonctions.rs   : registre figé (arité, exactitude, rappel)
//! - eval.rs        : parcours de l’AST + moteur avec cache d’AST + API evaluate/execute
//! - format.rs      : EXACT, lecture décimale tronquée, lecture flottante
//! - erreur.rs      : erreurs typées
//! - echantillon.rs : échantillonnage / bisection côté appelant

pub mod analyse;
pub mod echantillon;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod rationnel;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use eval::{evaluate, execute};
