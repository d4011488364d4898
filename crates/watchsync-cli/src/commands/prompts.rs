use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal};
use watch_sync_core::CommonUser;
use watch_sync_models::User;

/// Answer to "create missing users first?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSyncChoice {
    CreateMissing,
    Skip,
}

/// Answer to "sync one user or all of them?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    One,
    All,
}

/// Source of the run's interactive decisions
pub trait ChoiceProvider {
    fn choose_user_sync(&mut self, missing: &[User]) -> Result<UserSyncChoice>;

    fn choose_scope(&mut self, users: &[CommonUser]) -> Result<SyncScope>;

    /// Index into `users` of the user to sync
    fn choose_user(&mut self, users: &[CommonUser]) -> Result<usize>;
}

/// Parse a 1-based menu selection
pub fn parse_choice(input: &str, options: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=options).contains(&n) => Some(n),
        _ => None,
    }
}

/// Menu text: a ruled title and 1-based numbered options
pub fn render_menu(title: &str, options: &[&str]) -> String {
    let rule = "=".repeat(60);
    let mut text = format!("\n{}\n{}\n", rule, title);
    for (idx, option) in options.iter().enumerate() {
        text.push_str(&format!("  {}. {}\n", idx + 1, option));
    }
    text.push_str(&rule);
    text
}

/// Read lines until one is a valid choice; `None` when input runs out
pub fn read_choice<R: BufRead>(
    input: &mut R,
    options: usize,
    mut on_invalid: impl FnMut(),
) -> io::Result<Option<usize>> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_choice(&line, options) {
            Some(n) => return Ok(Some(n)),
            None => on_invalid(),
        }
    }
}

/// Numbered prompts on the terminal; invalid input is asked again
///
/// Menus go to stderr so stdout stays clean for `--output json`. When stdin
/// is not a terminal, answers are read line by line from it.
pub struct TerminalChoices {
    output: Output,
}

impl TerminalChoices {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    fn menu(&self, title: &str, options: &[&str]) {
        eprintln!("{}", render_menu(title, options));
    }

    fn prompt_choice(&self, prompt: &str, options: usize, invalid: &str) -> Result<usize> {
        if !io::stdin().is_terminal() {
            eprintln!("{}:", prompt);
            let choice = read_choice(&mut io::stdin().lock(), options, || self.output.error(invalid))
                .map_err(|e| eyre!("Failed to read input: {}", e))?;
            return choice.ok_or_else(|| eyre!("Input ended before a valid choice was entered"));
        }

        loop {
            let input = Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| {
                    self.output.error(format!("Failed to read input: {}", e));
                    eyre!("Failed to read input: {}", e)
                })?;

            match parse_choice(&input, options) {
                Some(n) => return Ok(n),
                None => self.output.error(invalid),
            }
        }
    }
}

impl ChoiceProvider for TerminalChoices {
    fn choose_user_sync(&mut self, _missing: &[User]) -> Result<UserSyncChoice> {
        self.menu(
            "User Sync Options:",
            &[
                "Sync users first (create missing users)",
                "Skip user sync and proceed to watch history",
            ],
        );
        match self.prompt_choice("Enter your choice (1 or 2)", 2, "Invalid choice. Please enter 1 or 2.")? {
            1 => Ok(UserSyncChoice::CreateMissing),
            _ => Ok(UserSyncChoice::Skip),
        }
    }

    fn choose_scope(&mut self, _users: &[CommonUser]) -> Result<SyncScope> {
        self.menu("Watch History Sync Options:", &["Sync specific user", "Sync all users"]);
        match self.prompt_choice("Enter your choice (1 or 2)", 2, "Invalid choice. Please enter 1 or 2.")? {
            1 => Ok(SyncScope::One),
            _ => Ok(SyncScope::All),
        }
    }

    fn choose_user(&mut self, users: &[CommonUser]) -> Result<usize> {
        eprintln!("\nAvailable users:");
        for (idx, user) in users.iter().enumerate() {
            eprintln!("  {}. {}", idx + 1, user.name);
        }
        let n = self.prompt_choice(
            "Enter user number to sync",
            users.len(),
            "Invalid user number. Please try again.",
        )?;
        Ok(n - 1)
    }
}

/// Answers given up front on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetAnswers {
    pub user_sync: Option<UserSyncChoice>,
    pub user: Option<String>,
    pub all: bool,
}

/// Uses preset answers where given and asks `fallback` for the rest
pub struct PresetChoices<P> {
    answers: PresetAnswers,
    fallback: P,
}

impl<P: ChoiceProvider> PresetChoices<P> {
    pub fn new(answers: PresetAnswers, fallback: P) -> Self {
        Self { answers, fallback }
    }
}

impl<P: ChoiceProvider> ChoiceProvider for PresetChoices<P> {
    fn choose_user_sync(&mut self, missing: &[User]) -> Result<UserSyncChoice> {
        match self.answers.user_sync {
            Some(choice) => Ok(choice),
            None => self.fallback.choose_user_sync(missing),
        }
    }

    fn choose_scope(&mut self, users: &[CommonUser]) -> Result<SyncScope> {
        if self.answers.user.is_some() {
            Ok(SyncScope::One)
        } else if self.answers.all {
            Ok(SyncScope::All)
        } else {
            self.fallback.choose_scope(users)
        }
    }

    fn choose_user(&mut self, users: &[CommonUser]) -> Result<usize> {
        match &self.answers.user {
            Some(name) => users
                .iter()
                .position(|u| &u.name == name)
                .ok_or_else(|| eyre!("User '{}' does not exist on both servers", name)),
            None => self.fallback.choose_user(users),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays fixed answers; panics when asked more than scripted
    #[derive(Default)]
    pub struct ScriptedChoices {
        pub user_sync: VecDeque<UserSyncChoice>,
        pub scope: VecDeque<SyncScope>,
        pub user: VecDeque<usize>,
    }

    impl ChoiceProvider for ScriptedChoices {
        fn choose_user_sync(&mut self, _missing: &[User]) -> Result<UserSyncChoice> {
            Ok(self.user_sync.pop_front().expect("unexpected user sync prompt"))
        }

        fn choose_scope(&mut self, _users: &[CommonUser]) -> Result<SyncScope> {
            Ok(self.scope.pop_front().expect("unexpected scope prompt"))
        }

        fn choose_user(&mut self, _users: &[CommonUser]) -> Result<usize> {
            Ok(self.user.pop_front().expect("unexpected user prompt"))
        }
    }

    fn users() -> Vec<CommonUser> {
        vec![
            CommonUser::new("alice", "s1", "d1"),
            CommonUser::new("bob", "s2", "d2"),
        ]
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 2), Some(1));
        assert_eq!(parse_choice(" 2 \n", 2), Some(2));
        assert_eq!(parse_choice("0", 2), None);
        assert_eq!(parse_choice("3", 2), None);
        assert_eq!(parse_choice("", 2), None);
        assert_eq!(parse_choice("two", 2), None);
        assert_eq!(parse_choice("-1", 2), None);
        assert_eq!(parse_choice("1", 0), None);
    }

    #[test]
    fn test_render_menu() {
        let menu = render_menu("Watch History Sync Options:", &["Sync specific user", "Sync all users"]);
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines[2], "Watch History Sync Options:");
        assert_eq!(lines[3], "  1. Sync specific user");
        assert_eq!(lines[4], "  2. Sync all users");
    }

    #[test]
    fn test_read_choice_from_piped_lines() {
        let mut input = std::io::Cursor::new("x\n3\n 2 \n1\n");
        let mut invalid = 0;
        let choice = read_choice(&mut input, 2, || invalid += 1).unwrap();
        assert_eq!(choice, Some(2));
        assert_eq!(invalid, 2);
    }

    #[test]
    fn test_read_choice_runs_out_of_input() {
        let mut input = std::io::Cursor::new("9\n");
        assert_eq!(read_choice(&mut input, 2, || {}).unwrap(), None);
    }

    #[test]
    fn test_preset_user_by_name() {
        let answers = PresetAnswers {
            user: Some("bob".to_string()),
            ..PresetAnswers::default()
        };
        let mut choices = PresetChoices::new(answers, ScriptedChoices::default());
        assert_eq!(choices.choose_scope(&users()).unwrap(), SyncScope::One);
        assert_eq!(choices.choose_user(&users()).unwrap(), 1);
    }

    #[test]
    fn test_preset_unknown_user_is_an_error() {
        let answers = PresetAnswers {
            user: Some("Bob".to_string()),
            ..PresetAnswers::default()
        };
        let mut choices = PresetChoices::new(answers, ScriptedChoices::default());
        assert!(choices.choose_user(&users()).is_err());
    }

    #[test]
    fn test_preset_falls_back_when_unanswered() {
        let fallback = ScriptedChoices {
            user_sync: VecDeque::from([UserSyncChoice::Skip]),
            scope: VecDeque::from([SyncScope::All]),
            ..ScriptedChoices::default()
        };
        let mut choices = PresetChoices::new(PresetAnswers::default(), fallback);
        assert_eq!(choices.choose_user_sync(&[]).unwrap(), UserSyncChoice::Skip);
        assert_eq!(choices.choose_scope(&users()).unwrap(), SyncScope::All);
    }

    #[test]
    fn test_preset_answers_skip_prompts() {
        let answers = PresetAnswers {
            user_sync: Some(UserSyncChoice::CreateMissing),
            all: true,
            ..PresetAnswers::default()
        };
        // An empty script panics if consulted
        let mut choices = PresetChoices::new(answers, ScriptedChoices::default());
        assert_eq!(choices.choose_user_sync(&[]).unwrap(), UserSyncChoice::CreateMissing);
        assert_eq!(choices.choose_scope(&users()).unwrap(), SyncScope::All);
    }
}
