/// Một dòng người dùng nhập vào ô chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Send(String),
    Refresh,
    Quit,
}

/// Dòng trống trả về `None`; `/refresh` và `/quit` là lệnh, còn lại là tin nhắn.
pub fn parse(line: &str) -> Option<InputAction> {
    let trimmed = line.trim();
    match trimmed {
        "" => None,
        "/refresh" => Some(InputAction::Refresh),
        "/quit" | "/exit" => Some(InputAction::Quit),
        _ => Some(InputAction::Send(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_messages() {
        assert_eq!(parse("   "), None);
        assert_eq!(parse("/refresh\n"), Some(InputAction::Refresh));
        assert_eq!(parse("/exit"), Some(InputAction::Quit));
        assert_eq!(
            parse("  hello there \n"),
            Some(InputAction::Send("hello there".into()))
        );
    }
}
