use pasc::{Error, Lexer, TokenKind};

fn case(code: &str, expects: Vec<TokenKind>) {
    let tokens = Lexer::new(code).tokenize().unwrap();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?} {:?}", idx, token.kind, token.lexeme);
    }

    assert_eq!(tokens.len(), expects.len());
    for (idx, expect) in expects.iter().enumerate() {
        assert_eq!(tokens[idx].kind, *expect);
    }
}

fn fails(code: &str) -> Error {
    Lexer::new(code).tokenize().unwrap_err()
}

#[test]
fn keywords_and_identifiers() {
    use TokenKind::*;
    case(
        "program test; var abc : integer;",
        vec![
            SPROGRAM,
            SIDENTIFIER,
            SSEMICOLON,
            SVAR,
            SIDENTIFIER,
            SCOLON,
            SINTEGER,
            SSEMICOLON,
        ],
    );
}

#[test]
fn compound_symbols_are_greedy() {
    use TokenKind::*;
    case(
        "<> <= >= := .. < > = .",
        vec![
            SNOTEQUAL,
            SLESSEQUAL,
            SGREATEQUAL,
            SASSIGN,
            SRANGE,
            SLESS,
            SGREAT,
            SEQUAL,
            SDOT,
        ],
    );
}

#[test]
fn slash_and_div_are_the_same_operator() {
    use TokenKind::*;
    case("10 / 2", vec![SCONSTANT, SDIVD, SCONSTANT]);
    case("10 div 2", vec![SCONSTANT, SDIVD, SCONSTANT]);
}

#[test]
fn comments_are_skipped() {
    use TokenKind::*;
    case("begin { any text } end", vec![SBEGIN, SEND]);
}

#[test]
fn string_lexeme_keeps_quotes() {
    let tokens = Lexer::new("'ok'").tokenize().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::SSTRING);
    assert_eq!(tokens[0].lexeme, "'ok'");
}

#[test]
fn line_numbers_follow_newlines() {
    let tokens = Lexer::new("begin\n  writeln\nend").tokenize().unwrap();
    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[2].line, 3);
}

#[test]
fn trailing_letters_make_an_invalid_constant() {
    assert_eq!(
        fails("begin 12ab end"),
        Error::InvalidConstant {
            line: 1,
            lexeme: "12ab".to_string()
        }
    );
    assert_eq!(
        fails("123abc").to_string(),
        "Line 1: error: Invalid constant \"123abc\""
    );
}

#[test]
fn empty_string_is_rejected() {
    assert_eq!(fails("''"), Error::NullString { line: 1 });
}

#[test]
fn string_must_close_on_its_line() {
    assert_eq!(fails("'abc\n'"), Error::UnterminatedString { line: 1 });
    assert_eq!(fails("'abc"), Error::UnterminatedString { line: 1 });
}

#[test]
fn comment_must_close() {
    assert_eq!(fails("begin { note"), Error::UnterminatedComment { line: 1 });
}

#[test]
fn stray_characters_are_reported_with_their_line() {
    assert_eq!(fails("begin\n@"), Error::InvalidCharacter { line: 2, c: '@' });
    assert_eq!(fails("@").to_string(), "Line 1: error: Invalid character '@'");
}
