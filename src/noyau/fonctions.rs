//! Registre des fonctions intégrées.
//!
//! Construit une seule fois (`registre_global`), jamais muté ensuite :
//! partageable entre threads sans verrou. Chaque entrée porte :
//! - son contrat d’arité (`Arite::Exacte(n)` ou `Arite::Plage(min, max)`)
//! - sa classe d’exactitude (exacte / approchée)
//! - un rappel pur `&[BigRational] -> Option<BigRational>` ; `None` = hors domaine
//!
//! L’arité est vérifiée par le répartiteur AVANT le rappel : un rappel reçoit
//! toujours un nombre d’arguments conforme.

use std::fmt;
use std::sync::OnceLock;

use num_rational::BigRational;
use num_traits::Signed;
use rand::Rng;
use rustc_hash::FxHashMap;

use super::erreur::ErreurEval;
use super::rationnel::{
    depuis_f64, factorielle, ln_approche, log10_approche, maximum, minimum, pgcd, plafond,
    plancher, racine_approchee, racine_exacte,
};
use super::trig::{trig, trig_inverse, TrigFn, TrigInv};

/// Contrat d’arité.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arite {
    Exacte(usize),
    /// Bornes incluses.
    Plage(usize, usize),
}

impl Arite {
    pub fn accepte(self, n: usize) -> bool {
        match self {
            Arite::Exacte(k) => n == k,
            Arite::Plage(min, max) => (min..=max).contains(&n),
        }
    }

    pub fn verifier(self, nom: &str, n: usize) -> Result<(), ErreurEval> {
        if self.accepte(n) {
            Ok(())
        } else {
            Err(ErreurEval::Arite {
                nom: nom.to_string(),
                attendu: self,
                recu: n,
            })
        }
    }
}

impl fmt::Display for Arite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arite::Exacte(n) => write!(f, "{n}"),
            Arite::Plage(min, max) => write!(f, "{min} à {max}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exactitude {
    /// Résultat rationnel exact, jamais de flottant.
    Exacte,
    /// Calcul en f64 puis reconversion : perte de précision.
    Approchee,
}

type Rappel = fn(&[BigRational]) -> Option<BigRational>;

pub struct Fonction {
    pub nom: &'static str,
    pub arite: Arite,
    pub exactitude: Exactitude,
    /// false seulement pour rand().
    pub deterministe: bool,
    rappel: Rappel,
}

impl Fonction {
    /// Vérifie l’arité puis appelle le rappel.
    pub fn appeler(&self, args: &[BigRational]) -> Result<BigRational, ErreurEval> {
        self.arite.verifier(self.nom, args.len())?;
        (self.rappel)(args).ok_or_else(|| ErreurEval::domaine(self.nom, args))
    }
}

impl fmt::Debug for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fonction")
            .field("nom", &self.nom)
            .field("arite", &self.arite)
            .field("exactitude", &self.exactitude)
            .field("deterministe", &self.deterministe)
            .finish()
    }
}

/* ------------------------ Registre ------------------------ */

#[derive(Debug, Default)]
pub struct Registre {
    // ordre d’enregistrement conservé pour noms()
    fonctions: Vec<Fonction>,
    index: FxHashMap<&'static str, usize>,
}

impl Registre {
    fn register(
        &mut self,
        nom: &'static str,
        arite: Arite,
        exactitude: Exactitude,
        rappel: Rappel,
    ) -> &mut Fonction {
        let i = self.fonctions.len();
        self.index.insert(nom, i);
        self.fonctions.push(Fonction {
            nom,
            arite,
            exactitude,
            deterministe: true,
            rappel,
        });
        &mut self.fonctions[i]
    }

    /// Catalogue standard complet.
    pub fn standard() -> Self {
        use Arite::{Exacte as N, Plage};
        use Exactitude::{Approchee, Exacte};

        let mut r = Registre::default();

        r.register("abs", N(1), Exacte, |a| Some(a[0].abs()));
        r.register("ceil", N(1), Exacte, |a| Some(plafond(&a[0])));
        r.register("floor", N(1), Exacte, |a| Some(plancher(&a[0])));

        r.register("sin", Plage(1, 2), Approchee, |a| trig(TrigFn::Sin, a));
        r.register("cos", Plage(1, 2), Approchee, |a| trig(TrigFn::Cos, a));
        r.register("tan", Plage(1, 2), Approchee, |a| trig(TrigFn::Tan, a));
        r.register("asin", N(1), Approchee, |a| trig_inverse(TrigInv::Asin, a));
        r.register("acos", N(1), Approchee, |a| trig_inverse(TrigInv::Acos, a));
        r.register("atan", N(1), Approchee, |a| trig_inverse(TrigInv::Atan, a));

        // logarithmes lus en m·2^k : ln(10^400) reste calculable
        r.register("ln", N(1), Approchee, |a| depuis_f64(ln_approche(&a[0])?));
        r.register("log", N(1), Approchee, |a| depuis_f64(log10_approche(&a[0])?));
        r.register("logn", N(2), Approchee, |a| {
            depuis_f64(ln_approche(&a[1])? / ln_approche(&a[0])?)
        });

        r.register("max", N(2), Exacte, |a| Some(maximum(&a[0], &a[1])));
        r.register("min", N(2), Exacte, |a| Some(minimum(&a[0], &a[1])));

        r.register("sqrt", N(1), Approchee, |a| {
            if a[0].is_negative() {
                return None;
            }
            // carré parfait => exact, sinon approximation
            racine_exacte(&a[0]).or_else(|| racine_approchee(&a[0]))
        });

        r.register("rand", N(0), Approchee, |_| {
            depuis_f64(rand::thread_rng().gen::<f64>())
        })
        .deterministe = false;

        r.register("fact", N(1), Exacte, |a| factorielle(&a[0]));
        r.register("gcd", N(2), Exacte, |a| pgcd(&a[0], &a[1]));

        r.register("csc", Plage(1, 2), Approchee, |a| trig(TrigFn::Csc, a));
        r.register("sec", Plage(1, 2), Approchee, |a| trig(TrigFn::Sec, a));
        r.register("cot", Plage(1, 2), Approchee, |a| trig(TrigFn::Cot, a));

        r.register("deg2rad", N(1), Approchee, |a| {
            facteur(&a[0], std::f64::consts::PI / 180.0)
        });
        r.register("rad2deg", N(1), Approchee, |a| {
            facteur(&a[0], 180.0 / std::f64::consts::PI)
        });

        tracing::debug!(fonctions = r.fonctions.len(), "registre construit");
        r
    }

    pub fn get(&self, nom: &str) -> Option<&Fonction> {
        self.index.get(nom).map(|&i| &self.fonctions[i])
    }

    /// Noms enregistrés, dans l’ordre d’enregistrement (remplace `list`).
    pub fn noms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fonctions.iter().map(|f| f.nom)
    }

    pub fn len(&self) -> usize {
        self.fonctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonctions.is_empty()
    }
}

static REGISTRE: OnceLock<Registre> = OnceLock::new();

/// Registre standard du processus.
pub fn registre_global() -> &'static Registre {
    REGISTRE.get_or_init(Registre::standard)
}

/// x · f, le facteur f64 étant lu exactement : pas de débordement sur x.
fn facteur(x: &BigRational, f: f64) -> Option<BigRational> {
    Some(x * depuis_f64(f)?)
}
