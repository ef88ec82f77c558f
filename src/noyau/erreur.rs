// src/noyau/erreur.rs
//
// Erreurs typées du noyau.
// Toute défaillance remonte ici : jamais de valeur sentinelle (NaN, infini)
// glissée dans un rationnel.

use num_rational::BigRational;
use thiserror::Error;

use super::fonctions::Arite;
use super::format::texte_exact;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurEval {
    /// Aucun jeton ne commence à `position` (index en caractères).
    #[error("caractère inattendu '{caractere}' (position {position})")]
    Lexicale { position: usize, caractere: char },

    #[error("position {position} : attendu {attendu}, trouvé {trouve}")]
    Syntaxe {
        position: usize,
        attendu: String,
        trouve: String,
    },

    #[error("variable non définie : {0}")]
    VariableIndefinie(String),

    #[error("fonction inconnue : {0}")]
    FonctionInconnue(String),

    #[error("{nom} : attendu {attendu} argument(s), reçu {recu}")]
    Arite {
        nom: String,
        attendu: Arite,
        recu: usize,
    },

    #[error("division par zéro")]
    DivisionParZero,

    #[error("hors domaine : {fonction}({})", liste_arguments(.arguments))]
    Domaine {
        fonction: String,
        arguments: Vec<BigRational>,
    },
}

impl ErreurEval {
    pub(crate) fn domaine(fonction: &str, arguments: &[BigRational]) -> Self {
        ErreurEval::Domaine {
            fonction: fonction.to_string(),
            arguments: arguments.to_vec(),
        }
    }
}

fn liste_arguments(args: &[BigRational]) -> String {
    args.iter().map(texte_exact).collect::<Vec<_>>().join(", ")
}
