//! Raw access to the timing delegate

use crate::commands::{CommandContext, CommandOutcome};
use crate::timing::Matcher;
use colored::*;
use instruments_core::ArgValue;
use std::time::Duration;

/// How long `send` waits for the delegate to answer
const SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle `send <Command.path> [args...]`
///
/// `Note.stop` answers only after its delay, so long delays time out here
/// while the stop still fires in the background.
pub fn cmd_send(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    let mut tokens = args.split_whitespace();
    let path = tokens.next().unwrap_or("");
    let values: Vec<ArgValue> = tokens.map(ArgValue::parse_token).collect();

    let pending = match ctx.client.request_path(path, &values, Matcher::token()) {
        Ok(pending) => pending,
        Err(e) => return CommandOutcome::Error(e.to_string()),
    };

    match pending.wait_timeout(SEND_TIMEOUT) {
        Ok(result) if result.is_failure() => CommandOutcome::Error(result.to_string()),
        Ok(result) => CommandOutcome::Message(
            format!("{} {} → {}", pending.correlation(), path, result)
                .bright_blue()
                .to_string(),
        ),
        Err(e) => CommandOutcome::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_context;
    use crate::timing::Timer;

    #[test]
    fn test_send_next_id() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);
        match cmd_send("Instruments.getNextId", &mut ctx) {
            CommandOutcome::Message(msg) => assert!(msg.contains("Instruments.getNextId")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_send_reports_path_errors() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);

        match cmd_send("", &mut ctx) {
            CommandOutcome::Error(e) => assert!(e.contains("'command'"), "{}", e),
            other => panic!("unexpected {:?}", other),
        }
        match cmd_send("Instrument.explode", &mut ctx) {
            CommandOutcome::Error(e) => assert!(e.contains("doesn't exist"), "{}", e),
            other => panic!("unexpected {:?}", other),
        }
        match cmd_send("Note.stop 0", &mut ctx) {
            CommandOutcome::Error(e) => assert!(e.contains("2nd"), "{}", e),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_send_failure_result() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);
        assert!(matches!(
            cmd_send("Instrument.unregister 42", &mut ctx),
            CommandOutcome::Error(_)
        ));
    }
}
