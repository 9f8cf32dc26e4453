//! Name-keyed command table with overload resolution.
//!
//! A command owns one or more signatures. Dispatch picks the first signature,
//! in registration order, whose arity matches and whose parameters all convert
//! from the raw tokens, then invokes its handler with the converted arguments.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),
    #[error("could not parse the parameters for {command} ({given} given)")]
    ParameterMismatch { command: String, given: usize },
}

/// Parameter types a command may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Str,
}

impl ParamKind {
    pub fn convert(self, raw: &str) -> Option<Arg> {
        match self {
            ParamKind::Int => raw.parse().ok().map(Arg::Int),
            ParamKind::Str => Some(Arg::Str(raw.to_string())),
        }
    }
}

/// A converted argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(i64),
    Str(String),
}

/// Typed extraction of a converted argument
pub trait FromArg: Sized {
    const KIND: ParamKind;

    fn from_arg(arg: Arg) -> Option<Self>;
}

impl FromArg for i64 {
    const KIND: ParamKind = ParamKind::Int;

    fn from_arg(arg: Arg) -> Option<Self> {
        match arg {
            Arg::Int(value) => Some(value),
            Arg::Str(_) => None,
        }
    }
}

impl FromArg for String {
    const KIND: ParamKind = ParamKind::Str;

    fn from_arg(arg: Arg) -> Option<Self> {
        match arg {
            Arg::Str(value) => Some(value),
            Arg::Int(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
}

type Handler<T, E> = Box<dyn Fn(&mut T, Vec<Arg>) -> Result<String, E>>;

pub struct Signature<T, E> {
    params: Vec<Param>,
    handler: Handler<T, E>,
}

impl<T, E> Signature<T, E> {
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    fn convert<S: AsRef<str>>(&self, raw: &[S]) -> Option<Vec<Arg>> {
        if self.params.len() != raw.len() {
            return None;
        }
        self.params
            .iter()
            .zip(raw)
            .map(|(param, raw)| param.kind.convert(raw.as_ref()))
            .collect()
    }
}

struct Command<T, E> {
    name: String,
    signatures: Vec<Signature<T, E>>,
}

pub struct CommandRegistry<T, E> {
    commands: Vec<Command<T, E>>,
    by_name: HashMap<String, usize>,
    aliases: Vec<(String, String)>,
}

impl<T, E> Default for CommandRegistry<T, E> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            by_name: HashMap::new(),
            aliases: Vec::new(),
        }
    }
}

impl<T: 'static, E: From<DispatchError> + 'static> CommandRegistry<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature under `name`; repeated names become overloads.
    pub fn register(
        &mut self,
        name: &str,
        params: Vec<Param>,
        handler: impl Fn(&mut T, Vec<Arg>) -> Result<String, E> + 'static,
    ) -> &mut Self {
        let key = name.to_lowercase();
        let index = match self.by_name.get(&key) {
            Some(&index) => index,
            None => {
                self.commands.push(Command {
                    name: key.clone(),
                    signatures: Vec::new(),
                });
                self.by_name.insert(key, self.commands.len() - 1);
                self.commands.len() - 1
            }
        };

        self.commands[index].signatures.push(Signature {
            params,
            handler: Box::new(handler),
        });
        self
    }

    pub fn register0(
        &mut self,
        name: &str,
        handler: impl Fn(&mut T) -> Result<String, E> + 'static,
    ) -> &mut Self {
        self.register(name, Vec::new(), move |target, _| handler(target))
    }

    pub fn register1<A: FromArg + 'static>(
        &mut self,
        name: &str,
        param: &'static str,
        handler: impl Fn(&mut T, A) -> Result<String, E> + 'static,
    ) -> &mut Self {
        let params = vec![Param {
            name: param,
            kind: A::KIND,
        }];
        self.register(name, params, move |target, args| {
            // `Signature::convert` already produced exactly `A::KIND`.
            let Some(a) = args.into_iter().next().and_then(A::from_arg) else {
                unreachable!("argument converted to its declared kind");
            };
            handler(target, a)
        })
    }

    pub fn register2<A: FromArg + 'static, B: FromArg + 'static>(
        &mut self,
        name: &str,
        params: [&'static str; 2],
        handler: impl Fn(&mut T, A, B) -> Result<String, E> + 'static,
    ) -> &mut Self {
        let declared = vec![
            Param {
                name: params[0],
                kind: A::KIND,
            },
            Param {
                name: params[1],
                kind: B::KIND,
            },
        ];
        self.register(name, declared, move |target, args| {
            let mut args = args.into_iter();
            let (Some(a), Some(b)) = (
                args.next().and_then(A::from_arg),
                args.next().and_then(B::from_arg),
            ) else {
                unreachable!("arguments converted to their declared kinds");
            };
            handler(target, a, b)
        })
    }

    /// Make `alias` dispatch to an already registered command.
    ///
    /// # Panics
    ///
    /// Panics if `target` has not been registered; the table is static.
    pub fn alias(&mut self, alias: &str, target: &str) -> &mut Self {
        let target = target.to_lowercase();
        let Some(&index) = self.by_name.get(&target) else {
            panic!("alias {alias} refers to unregistered command {target}");
        };
        let alias = alias.to_lowercase();
        self.by_name.insert(alias.clone(), index);
        self.aliases.push((alias, target));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_lowercase())
    }

    /// Canonical command names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|command| command.name.as_str())
    }

    pub fn signatures(&self, name: &str) -> Option<&[Signature<T, E>]> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| self.commands[index].signatures.as_slice())
    }

    /// Resolve `name` and `raw` against the table and run the chosen handler
    pub fn execute<S: AsRef<str>>(&self, target: &mut T, name: &str, raw: &[S]) -> Result<String, E> {
        let command = self
            .by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.commands[index])
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        for (overload, signature) in command.signatures.iter().enumerate() {
            if let Some(args) = signature.convert(raw) {
                debug!(command = %command.name, overload, arity = raw.len(), "dispatching command");
                return (signature.handler)(target, args);
            }
        }

        Err(mismatch(&command.name, raw.len()).into())
    }

    /// One `name(param, ...)` line per signature, then the alias list
    pub fn help(&self) -> String {
        let mut lines: Vec<String> = self
            .commands
            .iter()
            .flat_map(|command| {
                command.signatures.iter().map(move |signature| {
                    let params = signature
                        .params
                        .iter()
                        .map(|param| param.name)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}({})", command.name, params)
                })
            })
            .collect();

        if !self.aliases.is_empty() {
            lines.push(String::new());
            lines.extend(
                self.aliases
                    .iter()
                    .map(|(alias, target)| format!("{alias} -> {target}")),
            );
        }

        lines.join("\n")
    }
}

fn mismatch(command: &str, given: usize) -> DispatchError {
    DispatchError::ParameterMismatch {
        command: command.to_string(),
        given,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: i64,
        label: String,
    }

    fn registry() -> CommandRegistry<Counter, DispatchError> {
        let mut registry = CommandRegistry::new();
        registry
            .register0("bump", |c: &mut Counter| {
                c.value += 1;
                Ok(String::new())
            })
            .register1("bump", "n", |c: &mut Counter, n: i64| {
                c.value += n;
                Ok(format!("bumped by {n}"))
            })
            .register1("label", "text", |c: &mut Counter, text: String| {
                c.label = text;
                Ok(String::new())
            })
            .register2("set", ["value", "label"], |c: &mut Counter, v: i64, l: String| {
                c.value = v;
                c.label = l;
                Ok(String::new())
            })
            .alias("inc", "bump");
        registry
    }

    #[test]
    fn execute__zero_arg_overload__then_selected_by_arity() {
        let registry = registry();
        let mut counter = Counter::default();

        let out = registry.execute::<&str>(&mut counter, "bump", &[]).unwrap();
        assert_eq!(out, "");
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn execute__int_overload__then_converted() {
        let registry = registry();
        let mut counter = Counter::default();

        let out = registry.execute(&mut counter, "BUMP", &["5"]).unwrap();
        assert_eq!(out, "bumped by 5");
        assert_eq!(counter.value, 5);
    }

    #[test]
    fn execute__int_param_not_numeric__then_parameter_mismatch() {
        let registry = registry();
        let mut counter = Counter::default();

        let err = registry.execute(&mut counter, "bump", &["five"]).unwrap_err();
        assert_eq!(
            err,
            DispatchError::ParameterMismatch {
                command: "bump".to_string(),
                given: 1
            }
        );
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn execute__string_param__then_passed_through() {
        let registry = registry();
        let mut counter = Counter::default();

        registry.execute(&mut counter, "label", &["42"]).unwrap();
        assert_eq!(counter.label, "42");
    }

    #[test]
    fn execute__mixed_params__then_positional_conversion() {
        let registry = registry();
        let mut counter = Counter::default();

        registry.execute(&mut counter, "set", &["-3", "x"]).unwrap();
        assert_eq!((counter.value, counter.label.as_str()), (-3, "x"));

        assert!(registry.execute(&mut counter, "set", &["x", "-3"]).is_err());
    }

    #[test]
    fn execute__same_arity_different_kinds__then_first_converting_signature() {
        let mut registry: CommandRegistry<Counter, DispatchError> = CommandRegistry::new();
        registry
            .register1("put", "n", |c: &mut Counter, n: i64| {
                c.value = n;
                Ok("int".to_string())
            })
            .register1("put", "text", |c: &mut Counter, text: String| {
                c.label = text;
                Ok("text".to_string())
            });
        let mut counter = Counter::default();

        assert_eq!(registry.execute(&mut counter, "put", &["7"]).unwrap(), "int");
        assert_eq!(registry.execute(&mut counter, "put", &["seven"]).unwrap(), "text");
        assert_eq!((counter.value, counter.label.as_str()), (7, "seven"));
    }

    #[test]
    fn execute__unknown_name__then_unknown_command() {
        let registry = registry();
        let mut counter = Counter::default();

        let err = registry.execute::<&str>(&mut counter, "jump", &[]).unwrap_err();
        assert_eq!(err, DispatchError::UnknownCommand("jump".to_string()));
    }

    #[test]
    fn execute__alias__then_dispatches_to_target() {
        let registry = registry();
        let mut counter = Counter::default();

        registry.execute(&mut counter, "inc", &["2"]).unwrap();
        assert_eq!(counter.value, 2);
        assert!(registry.contains("INC"));
    }

    #[test]
    fn signatures__overloaded_name__then_registration_order() {
        let registry = registry();
        let signatures = registry.signatures("bump").unwrap();
        assert_eq!(signatures.len(), 2);
        assert!(signatures[0].params().is_empty());
        assert_eq!(signatures[1].params()[0].kind, ParamKind::Int);
    }

    #[test]
    fn help__registered_commands__then_one_line_per_signature() {
        let registry = registry();
        assert_eq!(
            registry.help(),
            "bump()\nbump(n)\nlabel(text)\nset(value, label)\n\ninc -> bump"
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["bump", "label", "set"]);
    }

    #[test]
    #[should_panic(expected = "unregistered command")]
    fn alias__unknown_target__then_panics() {
        let mut registry: CommandRegistry<Counter, DispatchError> = CommandRegistry::new();
        registry.alias("x", "nothing");
    }
}
