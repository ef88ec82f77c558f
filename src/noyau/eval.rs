//! Noyau — évaluation (pipeline réel)
//!
//! texte -> jetons -> Expr (mise en cache par texte exact) -> parcours strict -> rationnel
//!
//! - Environnement : fourni par l’appelant pour UN appel, jamais muté ici.
//!   Les constantes (pi, e) sont des entrées ordinaires de l’environnement :
//!   l’évaluateur ne fait aucun repli implicite.
//! - Registre : référence partagée, lue seulement.
//! - `^` : exposant entier => exact ; sinon repli f64 (perte assumée et bornée :
//!   un appelant qui veut l’exactitude s’en tient aux exposants entiers).

use std::sync::{Arc, OnceLock};

use num_rational::BigRational;
use num_traits::{Signed, Zero};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::analyse::parse;
use super::erreur::ErreurEval;
use super::expr::{Expr, OpBinaire, OpUnaire};
use super::fonctions::{registre_global, Registre};
use super::rationnel::{self, comme_entier, depuis_f64, puissance_entiere, reste, vers_f64};

/// Capacité du cache d’AST ; au-delà on le vide.
pub const CACHE_MAX: usize = 1024;

/* ------------------------ Environnement ------------------------ */

/// Liaisons nom -> valeur pour un appel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environnement {
    liaisons: FxHashMap<String, BigRational>,
}

impl Environnement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute (ou remplace) une liaison.
    pub fn definir(&mut self, nom: impl Into<String>, valeur: BigRational) {
        self.liaisons.insert(nom.into(), valeur);
    }

    /// Variante chaînable de `definir`.
    pub fn avec(mut self, nom: impl Into<String>, valeur: BigRational) -> Self {
        self.definir(nom, valeur);
        self
    }

    pub fn get(&self, nom: &str) -> Option<&BigRational> {
        self.liaisons.get(nom)
    }

    pub fn len(&self) -> usize {
        self.liaisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liaisons.is_empty()
    }

    /// Copie de `self` où chaque liaison de `dessus` masque la sienne.
    pub fn superpose(&self, dessus: &Environnement) -> Environnement {
        let mut out = self.clone();
        for (nom, v) in &dessus.liaisons {
            out.liaisons.insert(nom.clone(), v.clone());
        }
        out
    }
}

impl<S: Into<String>> FromIterator<(S, BigRational)> for Environnement {
    fn from_iter<I: IntoIterator<Item = (S, BigRational)>>(iter: I) -> Self {
        let mut env = Environnement::new();
        for (nom, v) in iter {
            env.definir(nom, v);
        }
        env
    }
}

/// `pi` et `e` en approximations rationnelles précises.
pub fn constantes() -> Environnement {
    Environnement::new()
        .avec("pi", rationnel::pi().clone())
        .avec("e", rationnel::e().clone())
}

fn constantes_partagees() -> &'static Environnement {
    static CONSTANTES: OnceLock<Environnement> = OnceLock::new();
    CONSTANTES.get_or_init(constantes)
}

/* ------------------------ Évaluateur ------------------------ */

/// Parcours strict (arguments évalués de gauche à droite), une passe, sans cache.
pub struct Evaluateur<'a> {
    env: &'a Environnement,
    registre: &'a Registre,
}

impl<'a> Evaluateur<'a> {
    pub fn new(env: &'a Environnement, registre: &'a Registre) -> Self {
        Self { env, registre }
    }

    pub fn evaluer(&self, e: &Expr) -> Result<BigRational, ErreurEval> {
        match e {
            Expr::Nombre(r) => Ok(r.clone()),

            Expr::Var(nom) => self
                .env
                .get(nom)
                .cloned()
                .ok_or_else(|| ErreurEval::VariableIndefinie(nom.clone())),

            Expr::Unaire(OpUnaire::Neg, x) => Ok(-self.evaluer(x)?),

            Expr::Binaire(op, a, b) => {
                let va = self.evaluer(a)?;
                let vb = self.evaluer(b)?;
                binaire(*op, va, vb)
            }

            Expr::Appel(nom, args) => {
                let f = self
                    .registre
                    .get(nom)
                    .ok_or_else(|| ErreurEval::FonctionInconnue(nom.clone()))?;

                // arité vérifiée avant toute évaluation d’argument
                f.arite.verifier(f.nom, args.len())?;

                let valeurs = args
                    .iter()
                    .map(|a| self.evaluer(a))
                    .collect::<Result<Vec<_>, _>>()?;

                tracing::trace!(fonction = f.nom, args = valeurs.len(), "appel");
                f.appeler(&valeurs)
            }
        }
    }
}

fn binaire(op: OpBinaire, a: BigRational, b: BigRational) -> Result<BigRational, ErreurEval> {
    match op {
        OpBinaire::Add => Ok(a + b),
        OpBinaire::Sub => Ok(a - b),
        OpBinaire::Mul => Ok(a * b),
        OpBinaire::Div => {
            if b.is_zero() {
                return Err(ErreurEval::DivisionParZero);
            }
            Ok(a / b)
        }
        OpBinaire::Mod => reste(&a, &b).ok_or(ErreurEval::DivisionParZero),
        OpBinaire::Pow => puissance(a, b),
    }
}

fn puissance(base: BigRational, exp: BigRational) -> Result<BigRational, ErreurEval> {
    if let Some(n) = comme_entier(&exp) {
        if base.is_zero() && n.is_negative() {
            return Err(ErreurEval::DivisionParZero);
        }
        return puissance_entiere(&base, n)
            .ok_or_else(|| ErreurEval::domaine("^", &[base.clone(), exp.clone()]));
    }

    // exposant non entier : repli flottant
    let (x, ok_x) = vers_f64(&base);
    let (y, ok_y) = vers_f64(&exp);
    if ok_x && ok_y {
        if let Some(r) = depuis_f64(x.powf(y)) {
            return Ok(r);
        }
    }
    Err(ErreurEval::domaine("^", &[base, exp]))
}

/* ------------------------ Moteur (cache d’AST) ------------------------ */

/// Évalue des textes contre un registre, en gardant l’AST de chaque texte déjà vu.
/// L’AST est une fonction pure du texte : pas d’invalidation nécessaire.
pub struct Moteur<'r> {
    registre: &'r Registre,
    cache: Mutex<FxHashMap<String, Arc<Expr>>>,
}

impl<'r> Moteur<'r> {
    pub fn new(registre: &'r Registre) -> Self {
        Self {
            registre,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn registre(&self) -> &'r Registre {
        self.registre
    }

    /// AST du texte (analysé au premier passage). Les erreurs ne sont pas mises en cache.
    pub fn compiler(&self, texte: &str) -> Result<Arc<Expr>, ErreurEval> {
        if let Some(ast) = self.cache.lock().get(texte) {
            return Ok(Arc::clone(ast));
        }

        // analyse hors verrou
        let ast = Arc::new(parse(texte)?);

        let mut cache = self.cache.lock();
        if cache.len() >= CACHE_MAX {
            cache.clear();
        }
        cache.insert(texte.to_string(), Arc::clone(&ast));
        tracing::debug!(longueur = texte.len(), taille = cache.len(), "cache AST : ajout");
        Ok(ast)
    }

    /// Évaluation avec l’environnement tel quel (aucune constante ajoutée).
    pub fn evaluer_avec(
        &self,
        texte: &str,
        env: &Environnement,
    ) -> Result<BigRational, ErreurEval> {
        let ast = self.compiler(texte)?;
        Evaluateur::new(env, self.registre).evaluer(&ast)
    }

    pub fn taille_cache(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn vider_cache(&self) {
        self.cache.lock().clear();
    }
}

static MOTEUR: OnceLock<Moteur<'static>> = OnceLock::new();

/// Moteur du processus (registre standard + cache partagé).
pub fn moteur_global() -> &'static Moteur<'static> {
    MOTEUR.get_or_init(|| Moteur::new(registre_global()))
}

/* ------------------------ API publique ------------------------ */

/// Évalue avec les seules constantes intégrées (`pi`, `e`).
pub fn evaluate(expression: &str) -> Result<BigRational, ErreurEval> {
    moteur_global().evaluer_avec(expression, constantes_partagees())
}

/// Évalue avec les liaisons de l’appelant, posées par-dessus `pi` et `e`
/// (une liaison de l’appelant masque la constante de même nom).
pub fn execute(expression: &str, variables: &Environnement) -> Result<BigRational, ErreurEval> {
    let env = constantes_partagees().superpose(variables);
    moteur_global().evaluer_avec(expression, &env)
}
