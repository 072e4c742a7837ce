#[cfg(test)]
mod scanner_tests {
    use rlox as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_vs_identifiers() {
        assert_token_sequence(
            "var varx class classy _private for fortune",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "varx"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::IDENTIFIER, "_private"),
                (TokenType::FOR, "for"),
                (TokenType::IDENTIFIER, "fortune"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_skipped() {
        assert_token_sequence(
            "1 // the rest of this line vanishes != == \"even strings\"\n2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_number_literals() {
        let tokens: Vec<_> = Scanner::new(b"42 3.14 1.")
            .filter_map(Result::ok)
            .collect();

        // `1.` lexes as the number 1 followed by a bare dot.
        assert_eq!(tokens.len(), 5);

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 42.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }

        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 3.14),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }

        match tokens[2].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 1.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }

        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_scanner_06_string_literal_strips_quotes() {
        let tokens: Vec<_> = Scanner::new(b"\"hello world\"")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");

        match tokens[0].token_type {
            TokenType::STRING(ref s) => assert_eq!(s, "hello world"),
            ref other => panic!("expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_07_multiline_string_counts_lines() {
        let tokens: Vec<_> = Scanner::new(b"\"one\ntwo\"\nafter")
            .filter_map(Result::ok)
            .collect();

        // The string closes on line 2; `after` starts on line 3.
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].lexeme, "after");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_scanner_08_unterminated_string() {
        let results: Vec<_> = Scanner::new(b"\"never closed").collect();

        // One error for the string, then the EOF token.
        assert_eq!(results.len(), 2);

        let err = results[0].as_ref().unwrap_err();
        assert!(
            err.to_string().contains("Unterminated string."),
            "unexpected message: {}",
            err
        );

        assert_eq!(results[1].as_ref().unwrap().token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_09_unexpected_chars_in_stream() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source.as_bytes()).collect();

        // Errors are yielded in-stream and scanning continues:
        // COMMA, DOT, error($), LEFT_PAREN, error(#), EOF.
        assert_eq!(results.len(), 6);

        assert_eq!(results[0].as_ref().unwrap().token_type, TokenType::COMMA);
        assert_eq!(results[1].as_ref().unwrap().token_type, TokenType::DOT);
        assert_eq!(
            results[3].as_ref().unwrap().token_type,
            TokenType::LEFT_PAREN
        );
        assert_eq!(results[5].as_ref().unwrap().token_type, TokenType::EOF);

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2);

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "unexpected message: {}",
                err
            );
        }
    }

    #[test]
    fn test_scanner_10_exactly_one_eof() {
        let mut scanner = Scanner::new(b"1");

        assert!(matches!(
            scanner.next(),
            Some(Ok(Token {
                token_type: TokenType::NUMBER(_),
                ..
            }))
        ));
        assert!(matches!(
            scanner.next(),
            Some(Ok(Token {
                token_type: TokenType::EOF,
                ..
            }))
        ));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none()); // fused
    }
}
