// src/noyau/jetons.rs
//
// Tokenisation : texte -> suite ordonnée de jetons, terminée par Fin.
// Supporte:
// - nombres décimaux / scientifiques (ex: 12, 1.25, .5, 3e-2, 6.02E23)
// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (sensibles à la casse)
// - opérateurs + - * / % ^
// - parenthèses ( ) et virgule
//
// Le texte du nombre est gardé tel quel : la valeur exacte est lue par l’analyse.

use super::erreur::ErreurEval;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Genre {
    Nombre,
    Ident,
    Operateur,
    ParG,
    ParD,
    Virgule,
    Fin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jeton {
    pub genre: Genre,
    pub texte: String,
    /// Index (en caractères) du premier caractère du jeton.
    pub position: usize,
}

impl Jeton {
    fn new(genre: Genre, texte: impl Into<String>, position: usize) -> Self {
        Self {
            genre,
            texte: texte.into(),
            position,
        }
    }

    pub fn est_operateur(&self, op: char) -> bool {
        self.genre == Genre::Operateur && self.texte.starts_with(op)
    }

    /// Description lisible pour les erreurs d’analyse.
    pub fn decrire(&self) -> String {
        match self.genre {
            Genre::Fin => "fin de l’expression".to_string(),
            _ => format!("'{}'", self.texte),
        }
    }
}

/// Tokenize une chaîne en jetons (le dernier est toujours `Genre::Fin`).
pub fn tokenize(s: &str) -> Result<Vec<Jeton>, ErreurEval> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Ponctuation + opérateurs (un caractère)
        let simple = match c {
            '(' => Some(Genre::ParG),
            ')' => Some(Genre::ParD),
            ',' => Some(Genre::Virgule),
            '+' | '-' | '*' | '/' | '%' | '^' => Some(Genre::Operateur),
            _ => None,
        };
        if let Some(genre) = simple {
            out.push(Jeton::new(genre, c, i));
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let mot: String = chars[start..i].iter().collect();
            out.push(Jeton::new(Genre::Ident, mot, start));
            continue;
        }

        // Nombre : chiffres [. chiffres] [e|E [+|-] chiffres]  ou  . chiffres [...]
        let point_chiffre = c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit());
        if c.is_ascii_digit() || point_chiffre {
            let start = i;
            i = avance_chiffres(&chars, i);

            if i < chars.len() && chars[i] == '.' {
                i = avance_chiffres(&chars, i + 1);
            }

            // exposant : consommé seulement si des chiffres suivent ("2e" = 2 puis ident e)
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = avance_chiffres(&chars, j);
                }
            }

            let texte: String = chars[start..i].iter().collect();
            out.push(Jeton::new(Genre::Nombre, texte, start));
            continue;
        }

        return Err(ErreurEval::Lexicale {
            position: i,
            caractere: c,
        });
    }

    out.push(Jeton::new(Genre::Fin, "", chars.len()));
    Ok(out)
}

fn avance_chiffres(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    i
}

/// Format utilitaire (debug) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Jeton]) -> String {
    tokens
        .iter()
        .filter(|t| t.genre != Genre::Fin)
        .map(|t| t.texte.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
