//! Calcul Q-pur — noyau d’expressions exact
//!
//! Tokenizer, analyse par descente récursive et évaluation d’AST sur des
//! rationnels à précision arbitraire, avec un registre figé de fonctions
//! intégrées et des liaisons de variables fournies à chaque appel.
//!
//! ```
//! use calcul_qpur::{evaluate, execute, Environnement, RationnelExt};
//! use num_bigint::BigInt;
//! use num_rational::BigRational;
//!
//! assert_eq!(evaluate("4/8").unwrap().texte_exact(), "1/2");
//!
//! let env = Environnement::new().avec("x", BigRational::from_integer(BigInt::from(5)));
//! assert_eq!(execute("x + 1", &env).unwrap().texte_exact(), "6");
//! ```

pub mod noyau;

pub use noyau::echantillon::Courbe;
pub use noyau::erreur::ErreurEval;
pub use noyau::eval::{
    constantes, evaluate, execute, moteur_global, Environnement, Evaluateur, Moteur,
};
pub use noyau::expr::Expr;
pub use noyau::fonctions::{registre_global, Arite, Exactitude, Fonction, Registre};
pub use noyau::format::{format_decimal, texte_exact, RationnelExt};
