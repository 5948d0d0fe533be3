//! # Signature Policy DSL
//!
//! Compiles expressions such as `OR('Org1MSP.admin')` or
//! `OutOf(2, 'Org1MSP.member', 'Org2MSP.member', 'Org3MSP.member')` into a
//! `SignaturePolicyEnvelope`.
//!
//! Principals are deduplicated in order of first appearance; rules refer to
//! them by index.

use fcp_01_block_codec::proto::common::{
    signature_policy, ConfigPolicy, Policy, PolicyType, SignaturePolicy, SignaturePolicyEnvelope,
};
use fcp_01_block_codec::proto::msp::{msp_principal, msp_role::MspRoleType, MspPrincipal, MspRole};
use prost::Message;

use super::errors::ConfigOpError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Quoted(String),
    Number(i32),
    Open,
    Close,
    Comma,
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => text.push(ch),
                        None => return Err("unterminated quoted principal".to_string()),
                    }
                }
                tokens.push(Token::Quoted(text));
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let n = digits.parse().map_err(|_| format!("number {digits} out of range"))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_alphanumeric() {
                        break;
                    }
                    ident.push(d);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(tokens)
}

enum Gate {
    Or,
    And,
    OutOf(i32),
}

struct Compiler {
    tokens: Vec<Token>,
    pos: usize,
    identities: Vec<MspPrincipal>,
}

impl Compiler {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(format!("expected {expected:?}, found {t:?}")),
            None => Err(format!("expected {expected:?}, found end of input")),
        }
    }

    fn principal_index(&mut self, text: &str) -> Result<i32, String> {
        let (msp_id, role) = text
            .rsplit_once('.')
            .ok_or_else(|| format!("principal {text:?} is not of the form 'MSP.role'"))?;
        if msp_id.is_empty() {
            return Err(format!("principal {text:?} has an empty MSP ID"));
        }
        let role = match role.to_ascii_lowercase().as_str() {
            "member" => MspRoleType::Member,
            "admin" => MspRoleType::Admin,
            "client" => MspRoleType::Client,
            "peer" => MspRoleType::Peer,
            "orderer" => MspRoleType::Orderer,
            other => return Err(format!("unknown role {other:?}")),
        };
        let principal = MspPrincipal {
            principal_classification: msp_principal::Classification::Role as i32,
            principal: MspRole {
                msp_identifier: msp_id.to_string(),
                role: role as i32,
            }
            .encode_to_vec(),
        };
        let index = match self.identities.iter().position(|p| *p == principal) {
            Some(i) => i,
            None => {
                self.identities.push(principal);
                self.identities.len() - 1
            }
        };
        Ok(index as i32)
    }

    fn rule(&mut self) -> Result<SignaturePolicy, String> {
        match self.next() {
            Some(Token::Quoted(text)) => Ok(SignaturePolicy {
                r#type: Some(signature_policy::Type::SignedBy(self.principal_index(&text)?)),
            }),
            Some(Token::Ident(name)) => {
                self.expect(Token::Open)?;
                let gate = match name.to_ascii_lowercase().as_str() {
                    "or" => Gate::Or,
                    "and" => Gate::And,
                    "outof" => match self.next() {
                        Some(Token::Number(n)) => {
                            self.expect(Token::Comma)?;
                            Gate::OutOf(n)
                        }
                        other => return Err(format!("OutOf expects a count, found {other:?}")),
                    },
                    other => return Err(format!("unknown operator {other}")),
                };
                let mut rules = vec![self.rule()?];
                loop {
                    match self.next() {
                        Some(Token::Comma) => rules.push(self.rule()?),
                        Some(Token::Close) => break,
                        other => return Err(format!("expected ',' or ')', found {other:?}")),
                    }
                }
                let n = match gate {
                    Gate::Or => 1,
                    Gate::And => rules.len() as i32,
                    Gate::OutOf(n) if n >= 1 && n as usize <= rules.len() => n,
                    Gate::OutOf(n) => {
                        return Err(format!("OutOf count {n} invalid for {} rules", rules.len()))
                    }
                };
                Ok(SignaturePolicy {
                    r#type: Some(signature_policy::Type::NOutOf(signature_policy::NOutOf {
                        n,
                        rules,
                    })),
                })
            }
            other => Err(format!("expected operator or principal, found {other:?}")),
        }
    }
}

/// Compile a policy expression into a signature policy envelope.
pub fn compile_signature_policy(
    expression: &str,
) -> Result<SignaturePolicyEnvelope, ConfigOpError> {
    let invalid = |reason: String| ConfigOpError::InvalidPolicy {
        expression: expression.to_string(),
        reason,
    };
    let tokens = tokenize(expression).map_err(invalid)?;
    if tokens.is_empty() {
        return Err(invalid("empty expression".to_string()));
    }
    let mut compiler = Compiler {
        tokens,
        pos: 0,
        identities: Vec::new(),
    };
    let rule = compiler.rule().map_err(invalid)?;
    if compiler.pos < compiler.tokens.len() {
        return Err(invalid("trailing input after expression".to_string()));
    }
    Ok(SignaturePolicyEnvelope {
        version: 0,
        rule: Some(rule),
        identities: compiler.identities,
    })
}

/// A `SIGNATURE` config policy governed by `mod_policy`.
pub fn signature_config_policy(
    expression: &str,
    mod_policy: &str,
) -> Result<ConfigPolicy, ConfigOpError> {
    let envelope = compile_signature_policy(expression)?;
    Ok(ConfigPolicy {
        version: 0,
        policy: Some(Policy {
            r#type: PolicyType::Signature as i32,
            value: envelope.encode_to_vec(),
        }),
        mod_policy: mod_policy.to_string(),
    })
}
