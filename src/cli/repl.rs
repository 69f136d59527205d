//! Parsing of interactive game commands.
//!
//! Every command has an English name and a Portuguese synonym; the first
//! word picks the command and the rest of the line is its argument.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Go(String),
    Enter(String),
    Talk(String),
    /// `None` examines the current area.
    Examine(Option<String>),
    Take(String),
    Inventory,
    Skills,
    Areas,
    Theory,
    Accuse,
    Save,
    Progress,
    /// Raw argument; see [`pair_candidates`].
    Combine(String),
    Hints,
    Scan(String),
    Debug,
    Explore,
    /// `None` narrates the current location.
    Describe(Option<String>),
    Status,
    /// Known command missing its argument; carries the usage line.
    Usage(&'static str),
    Unknown(String),
    Empty,
}

/// Commands and their usage, for `help`.
pub const HELP: &[(&str, &str)] = &[
    ("help | ajuda", "Show this list"),
    ("status", "Where you are and what you carry"),
    ("areas", "Areas you can see in this location"),
    ("go | ir <n|name>", "Move to an area of the current location"),
    ("enter | entrar <location>", "Enter another location"),
    ("explore | explorar", "Search the current area"),
    ("examine | examinar [object]", "Examine an object or the current area"),
    ("describe | descrever [object]", "Narrated description"),
    ("take | pegar <object>", "Pick up an object"),
    ("combine | combinar <a> + <b>", "Combine two objects you hold"),
    ("inventory | inventario", "Objects you hold"),
    ("talk | falar <character>", "Start a conversation"),
    ("scan <code>", "Scan a QR code"),
    ("skills | habilidades", "Specialization levels"),
    ("theory | teoria", "Review clues and suspects"),
    ("accuse | acusar", "Submit your solution"),
    ("progress | progresso", "Completion percentage"),
    ("hints | dicas", "Ask for a hint"),
    ("save | salvar", "Save the game"),
    ("debug", "Dump the session"),
    ("exit | sair", "Leave the game"),
];

const CONNECTORS: [&str; 4] = ["with", "com", "and", "e"];

/// Ways to read `rest` as two names, most likely first.
///
/// `a + b` is taken as is. Otherwise every split around a connector word
/// (`with`, `com`, `and`, `e`) comes first, then every split between two
/// words, so names that contain a connector can still be matched.
pub fn pair_candidates(rest: &str) -> Vec<(String, String)> {
    if let Some((a, b)) = rest.split_once('+') {
        let (a, b) = (a.trim(), b.trim());
        return if a.is_empty() || b.is_empty() {
            Vec::new()
        } else {
            vec![(a.to_string(), b.to_string())]
        };
    }

    let words: Vec<&str> = rest.split_whitespace().collect();
    let mut candidates = Vec::new();
    for i in 1..words.len().saturating_sub(1) {
        if CONNECTORS.contains(&words[i].to_lowercase().as_str()) {
            candidates.push((words[..i].join(" "), words[i + 1..].join(" ")));
        }
    }
    for i in 1..words.len() {
        let pair = (words[..i].join(" "), words[i..].join(" "));
        if !candidates.contains(&pair) {
            candidates.push(pair);
        }
    }
    candidates
}

pub fn parse(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = || (!rest.is_empty()).then(|| rest.to_string());

    match word.to_lowercase().as_str() {
        "help" | "ajuda" | "?" => ReplCommand::Help,
        "exit" | "quit" | "sair" => ReplCommand::Exit,
        "go" | "ir" => arg().map_or(ReplCommand::Usage("go <n|name>"), ReplCommand::Go),
        "enter" | "entrar" => arg().map_or(
            ReplCommand::Usage("enter <location>"),
            ReplCommand::Enter,
        ),
        "talk" | "falar" => arg().map_or(
            ReplCommand::Usage("talk <character>"),
            ReplCommand::Talk,
        ),
        "examine" | "examinar" => ReplCommand::Examine(arg()),
        "take" | "pegar" => arg().map_or(ReplCommand::Usage("take <object>"), ReplCommand::Take),
        "inventory" | "inventario" | "inventário" | "inv" => ReplCommand::Inventory,
        "skills" | "habilidades" => ReplCommand::Skills,
        "areas" | "áreas" => ReplCommand::Areas,
        "theory" | "teoria" => ReplCommand::Theory,
        "accuse" | "acusar" => ReplCommand::Accuse,
        "save" | "salvar" => ReplCommand::Save,
        "progress" | "progresso" => ReplCommand::Progress,
        "combine" | "combinar" => {
            if pair_candidates(rest).is_empty() {
                ReplCommand::Usage("combine <a> + <b>")
            } else {
                ReplCommand::Combine(rest.to_string())
            }
        }
        "hints" | "hint" | "dicas" | "dica" => ReplCommand::Hints,
        "scan" => arg().map_or(ReplCommand::Usage("scan <code>"), ReplCommand::Scan),
        "debug" => ReplCommand::Debug,
        "explore" | "explorar" => ReplCommand::Explore,
        "describe" | "descrever" => ReplCommand::Describe(arg()),
        "status" | "look" | "olhar" => ReplCommand::Status,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Words that end a conversation.
pub fn is_farewell(line: &str) -> bool {
    matches!(
        line.trim().to_lowercase().as_str(),
        "" | "bye" | "goodbye" | "leave" | "exit" | "sair" | "tchau"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_synonyms_map_to_the_same_command() {
        assert_eq!(parse("ir 2"), ReplCommand::Go("2".into()));
        assert_eq!(parse("GO  Wine Cellar "), ReplCommand::Go("Wine Cellar".into()));
        assert_eq!(parse("falar Ana"), parse("talk Ana"));
        assert_eq!(parse("inventario"), ReplCommand::Inventory);
        assert_eq!(parse("sair"), ReplCommand::Exit);
        assert_eq!(parse("examinar"), ReplCommand::Examine(None));
        assert_eq!(parse("descrever chave"), ReplCommand::Describe(Some("chave".into())));
    }

    #[test]
    fn test_missing_arguments_and_unknown_words() {
        assert_eq!(parse("go"), ReplCommand::Usage("go <n|name>"));
        assert_eq!(parse("pegar"), ReplCommand::Usage("take <object>"));
        assert_eq!(parse("dance"), ReplCommand::Unknown("dance".into()));
        assert_eq!(parse("   "), ReplCommand::Empty);
    }

    #[test]
    fn test_combine_pairs() {
        assert_eq!(
            parse("combine old key + music box"),
            ReplCommand::Combine("old key + music box".into())
        );
        assert_eq!(
            pair_candidates("old key + music box"),
            vec![("old key".to_string(), "music box".to_string())]
        );
        assert_eq!(
            pair_candidates("chave com caixa")[0],
            ("chave".to_string(), "caixa".to_string())
        );
        assert_eq!(
            pair_candidates("1 2"),
            vec![("1".to_string(), "2".to_string())]
        );
        assert_eq!(parse("combine key"), ReplCommand::Usage("combine <a> + <b>"));
        assert_eq!(parse("combine key +"), ReplCommand::Usage("combine <a> + <b>"));
    }

    #[test]
    fn test_connector_inside_a_name_still_has_a_split() {
        let candidates = pair_candidates("pão e manteiga faca");
        assert_eq!(candidates[0], ("pão".to_string(), "manteiga faca".to_string()));
        assert!(candidates.contains(&("pão e manteiga".to_string(), "faca".to_string())));
    }

    #[test]
    fn test_farewells() {
        assert!(is_farewell("Tchau"));
        assert!(is_farewell(""));
        assert!(!is_farewell("where were you?"));
    }
}
