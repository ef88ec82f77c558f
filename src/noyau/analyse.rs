// src/noyau/analyse.rs
//
// Descente récursive : jetons -> Expr
// Précédences (de la plus faible à la plus forte) :
//   1) + -        (gauche)
//   2) * / %      (gauche)
//   3) - unaire
//   4) ^          (droite : 2^3^2 = 2^(3^2))
//   5) appel de fonction, parenthèses
//
// Grammaire:
//   expr  := term (('+'|'-') term)*
//   term  := unary (('*'|'/'|'%') unary)*
//   unary := '-' unary | power
//   power := atom ('^' unary)?
//   atom  := NOMBRE | IDENT | IDENT '(' args ')' | '(' expr ')'
//   args  := expr (',' expr)* | ε
//
// Conséquence : -2^2 = -(2^2) = -4, et 2^-1 est accepté.
// Aucune arithmétique ici, aucune recherche dans le registre : seulement la forme.

use super::erreur::ErreurEval;
use super::expr::{Expr, OpBinaire};
use super::jetons::{tokenize, Genre, Jeton};
use super::rationnel::depuis_litteral;

/// Garde-fou : imbrication maximale (parenthèses, moins unaires, exposants)
/// et hauteur maximale de l’AST produit (chaînes `1+1+...` comprises).
pub const PROFONDEUR_MAX: usize = 512;

const TROP_PROFOND: &str = "une expression moins imbriquée";

/// Sous-arbre et sa hauteur (feuille = 1).
type Branche = (Expr, usize);

/// Texte -> AST complet, ou erreur (jamais d’AST partiel).
pub fn parse(texte: &str) -> Result<Expr, ErreurEval> {
    let jetons = tokenize(texte)?;
    parse_jetons(&jetons)
}

/// Jetons (terminés par Fin) -> AST.
fn parse_jetons(jetons: &[Jeton]) -> Result<Expr, ErreurEval> {
    let mut a = Analyseur {
        jetons,
        pos: 0,
        profondeur: 0,
    };
    let (e, _) = a.expr()?;
    if a.courant().genre != Genre::Fin {
        return Err(a.erreur("un opérateur ou la fin de l’expression"));
    }
    Ok(e)
}

struct Analyseur<'a> {
    jetons: &'a [Jeton],
    pos: usize,
    profondeur: usize,
}

impl<'a> Analyseur<'a> {
    fn courant(&self) -> &'a Jeton {
        // le tokenizer garantit un Fin final ; on ne le dépasse jamais
        &self.jetons[self.pos.min(self.jetons.len() - 1)]
    }

    fn avancer(&mut self) -> &'a Jeton {
        let j = self.courant();
        if j.genre != Genre::Fin {
            self.pos += 1;
        }
        j
    }

    fn erreur(&self, attendu: &str) -> ErreurEval {
        erreur_sur(self.courant(), attendu)
    }

    fn attendre(&mut self, genre: Genre, attendu: &str) -> Result<(), ErreurEval> {
        if self.courant().genre == genre {
            self.avancer();
            Ok(())
        } else {
            Err(self.erreur(attendu))
        }
    }

    /// Opérateur binaire courant s’il fait partie de `ops`.
    fn operateur_parmi(&self, ops: &[char]) -> Option<OpBinaire> {
        let j = self.courant();
        if j.genre != Genre::Operateur {
            return None;
        }
        let c = j.texte.chars().next()?;
        if ops.contains(&c) {
            OpBinaire::depuis_char(c)
        } else {
            None
        }
    }

    /// Chaîne associative à gauche : `suivant (op suivant)*`.
    /// La hauteur croît d’un cran par maillon, donc elle est bornée ici aussi.
    fn chaine(
        &mut self,
        ops: &[char],
        suivant: fn(&mut Self) -> Result<Branche, ErreurEval>,
    ) -> Result<Branche, ErreurEval> {
        let mut g = suivant(self)?;
        while let Some(op) = self.operateur_parmi(ops) {
            let j = self.avancer();
            let d = suivant(self)?;
            g = joindre(op, g, d, j)?;
        }
        Ok(g)
    }

    fn expr(&mut self) -> Result<Branche, ErreurEval> {
        self.chaine(&['+', '-'], Self::term)
    }

    fn term(&mut self) -> Result<Branche, ErreurEval> {
        self.chaine(&['*', '/', '%'], Self::unary)
    }

    fn unary(&mut self) -> Result<Branche, ErreurEval> {
        self.profondeur += 1;
        if self.profondeur > PROFONDEUR_MAX {
            return Err(self.erreur(TROP_PROFOND));
        }

        let out = if self.courant().est_operateur('-') {
            let j = self.avancer();
            let (x, h) = self.unary()?;
            borner(h + 1, j).map(|h| (Expr::neg(x), h))
        } else {
            self.power()
        };

        self.profondeur -= 1;
        out
    }

    fn power(&mut self) -> Result<Branche, ErreurEval> {
        let base = self.atom()?;
        if self.courant().est_operateur('^') {
            let j = self.avancer();
            // opérande droit = unary : associativité à droite
            let exp = self.unary()?;
            return joindre(OpBinaire::Pow, base, exp, j);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Branche, ErreurEval> {
        let j = self.courant();
        match j.genre {
            Genre::Nombre => {
                let r = depuis_litteral(&j.texte)
                    .ok_or_else(|| self.erreur("un nombre représentable"))?;
                self.avancer();
                Ok((Expr::Nombre(r), 1))
            }

            Genre::Ident => {
                self.avancer();
                if self.courant().genre == Genre::ParG {
                    self.avancer();
                    let (args, h) = self.args()?;
                    let h = borner(h + 1, j)?;
                    Ok((Expr::Appel(j.texte.clone(), args), h))
                } else {
                    Ok((Expr::Var(j.texte.clone()), 1))
                }
            }

            Genre::ParG => {
                self.avancer();
                let e = self.expr()?;
                self.attendre(Genre::ParD, "')'")?;
                Ok(e)
            }

            _ => Err(self.erreur("un nombre, une variable, une fonction ou '('")),
        }
    }

    /// Après '(' : arguments séparés par des virgules, puis ')'.
    /// Rend aussi la plus grande hauteur parmi les arguments.
    fn args(&mut self) -> Result<(Vec<Expr>, usize), ErreurEval> {
        let mut args = Vec::new();
        let mut haut = 0;
        if self.courant().genre == Genre::ParD {
            self.avancer();
            return Ok((args, haut));
        }

        loop {
            let (a, h) = self.expr()?;
            args.push(a);
            haut = haut.max(h);
            match self.courant().genre {
                Genre::Virgule => {
                    self.avancer();
                }
                Genre::ParD => {
                    self.avancer();
                    return Ok((args, haut));
                }
                _ => return Err(self.erreur("',' ou ')'")),
            }
        }
    }
}

fn erreur_sur(j: &Jeton, attendu: &str) -> ErreurEval {
    ErreurEval::Syntaxe {
        position: j.position,
        attendu: attendu.to_string(),
        trouve: j.decrire(),
    }
}

/// Hauteur acceptée telle quelle, ou erreur située sur le jeton `j`.
fn borner(hauteur: usize, j: &Jeton) -> Result<usize, ErreurEval> {
    if hauteur > PROFONDEUR_MAX {
        Err(erreur_sur(j, TROP_PROFOND))
    } else {
        Ok(hauteur)
    }
}

fn joindre(op: OpBinaire, g: Branche, d: Branche, j: &Jeton) -> Result<Branche, ErreurEval> {
    let h = borner(g.1.max(d.1) + 1, j)?;
    Ok((Expr::binaire(op, g.0, d.0), h))
}
