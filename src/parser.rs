//! Parser: token akisindan AST uretir; tip ve sembol cozumlemesi parse
//! sirasinda yapilir. Ilk derleme hatasi parse'i durdurur.

use std::rc::Rc;

use crate::ast::{Expression, FunctionDeclaration, Statement, StatementKind};
use crate::environment::Environment;
use crate::errors::{CompileError, CompileErrorKind};
use crate::tokenizer::{Token, TokenKind, ASSIGNMENT_OPERATORS};
use crate::types::{is_integer, Identifier, TypeKind, TypeRef, TypeUsage};
use crate::value::Value;

/// Parse suresince yasayan durum: token akisi, using listesi ve parse
/// zamani sembol tablosu. Bindings gercek instance'lara donusmez; yurutme
/// kendi kayitlarini yapar.
pub struct ParsingContext {
    pub source: String,
    pub tokens: Vec<Token>,
    pub token_index: usize,
    pub scope_level: u32,
    pub using_namespaces: Vec<String>,
    bindings: Vec<Binding>,
    declared_functions: Vec<Identifier>,
}

struct Binding {
    identifier: Identifier,
    type_usage: TypeUsage,
    scope_level: u32,
}

impl ParsingContext {
    pub fn new(source: String, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            token_index: 0,
            scope_level: 0,
            using_namespaces: Vec::new(),
            bindings: Vec::new(),
            declared_functions: Vec::new(),
        }
    }

    fn text(&self, index: usize) -> &str {
        self.tokens[index].text(&self.source)
    }

    fn text_at(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text(&self.source))
    }

    fn current_text(&self) -> Option<&str> {
        self.text_at(self.token_index)
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    fn line(&self) -> u16 {
        self.tokens
            .get(self.token_index)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, kind: CompileErrorKind) -> CompileError {
        CompileError::new(self.line(), kind)
    }

    fn release_bindings(&mut self, scope_level: u32) {
        while self
            .bindings
            .last()
            .map_or(false, |b| b.scope_level >= scope_level)
        {
            self.bindings.pop();
        }
    }
}

impl Environment {
    pub(crate) fn parse(
        &mut self,
        ctx: &mut ParsingContext,
    ) -> Result<Vec<Rc<Statement>>, CompileError> {
        let mut statements = Vec::new();
        while ctx.token_index < ctx.tokens.len() {
            if let Some(statement) = self.parse_statement(ctx)? {
                statements.push(Rc::new(statement));
            }
        }
        Ok(statements)
    }

    fn parse_statement(
        &mut self,
        ctx: &mut ParsingContext,
    ) -> Result<Option<Statement>, CompileError> {
        let Some(token) = ctx.tokens.get(ctx.token_index).cloned() else {
            return Ok(None);
        };
        let line = token.line;
        let text = token.text(&ctx.source).to_string();

        match token.kind {
            TokenKind::Punctuation => {
                if text == "{" {
                    return self.parse_statement_block(ctx).map(Some);
                }
                // basibos ';' gibi noktalama deyim uretmez
                ctx.token_index += 1;
                Ok(None)
            }
            TokenKind::Keyword => match text.as_str() {
                "using" => self.parse_using_directive(ctx).map(Some),
                "if" => self.parse_statement_if(ctx).map(Some),
                "while" => self.parse_statement_while(ctx).map(Some),
                "for" => self.parse_statement_for(ctx).map(Some),
                "break" => self.parse_statement_break(ctx).map(Some),
                "continue" => self.parse_statement_continue(ctx).map(Some),
                "return" => self.parse_statement_return(ctx).map(Some),
                "void" => {
                    ctx.token_index += 1;
                    self.parse_statement_function_declaration(ctx, TypeUsage::default(), line)
                        .map(Some)
                }
                "const" => {
                    // tip yazimina dahil; parse_type_usage onceki token'a bakar
                    ctx.token_index += 1;
                    self.parse_statement_identifier(ctx)
                }
                _ => {
                    // deyim bicimi olmayan anahtar sozcukler atlanir
                    ctx.token_index += 1;
                    Ok(None)
                }
            },
            TokenKind::Identifier => self.parse_statement_identifier(ctx),
            TokenKind::Operator if text == "++" || text == "--" => {
                self.parse_statement_prefix_step(ctx, &text, line).map(Some)
            }
            _ => Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(text),
            )),
        }
    }

    fn parse_using_directive(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some("namespace") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("using".into())));
        }
        ctx.token_index += 1;

        let mut name = String::new();
        while let Some(text) = ctx.current_text() {
            if text == ";" {
                break;
            }
            name.push_str(text);
            ctx.token_index += 1;
        }
        ctx.token_index += 1;

        ctx.using_namespaces.push(name.clone());
        Ok(Statement {
            kind: StatementKind::UsingDirective(Identifier::new(name)),
            line,
        })
    }

    fn parse_statement_block(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        ctx.scope_level += 1;

        let mut statements = Vec::new();
        loop {
            if ctx.token_index >= ctx.tokens.len() {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UnexpectedSymbol("{".into()),
                ));
            }
            if ctx.current_text() == Some("}") {
                ctx.token_index += 1;
                break;
            }
            if let Some(statement) = self.parse_statement(ctx)? {
                statements.push(statement);
            }
        }

        ctx.release_bindings(ctx.scope_level);
        ctx.scope_level -= 1;
        Ok(Statement {
            kind: StatementKind::Block(statements),
            line,
        })
    }

    /// if/while/for govdeleri: tek deyim ya da blok; yalin ';' bos blok.
    fn parse_substatement(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        if ctx.current_text() == Some(";") {
            ctx.token_index += 1;
            return Ok(Statement {
                kind: StatementKind::Block(Vec::new()),
                line,
            });
        }
        match self.parse_statement(ctx)? {
            Some(statement) => Ok(statement),
            None => Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
                ctx.current_text().unwrap_or("").to_string(),
            ))),
        }
    }

    fn parse_statement_if(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some("(") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("if".into())));
        }
        ctx.token_index += 1;

        let close = self.find_closure(ctx, "(", ")")?;
        let condition = self.parse_expression(ctx, close.wrapping_sub(1))?;
        ctx.token_index = close + 1;

        let then_statement = Box::new(self.parse_substatement(ctx)?);
        let else_statement = if ctx.current_text() == Some("else") {
            ctx.token_index += 1;
            Some(Box::new(self.parse_substatement(ctx)?))
        } else {
            None
        };

        Ok(Statement {
            kind: StatementKind::If {
                condition,
                then_statement,
                else_statement,
            },
            line,
        })
    }

    fn parse_statement_while(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some("(") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("while".into())));
        }
        ctx.token_index += 1;

        let close = self.find_closure(ctx, "(", ")")?;
        let condition = self.parse_expression(ctx, close.wrapping_sub(1))?;
        ctx.token_index = close + 1;

        let loop_statement = Box::new(self.parse_substatement(ctx)?);
        Ok(Statement {
            kind: StatementKind::While {
                condition,
                loop_statement,
            },
            line,
        })
    }

    fn parse_statement_for(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some("(") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("for".into())));
        }

        // init/cond/inc/govde ayni scope'u paylasir
        ctx.scope_level += 1;
        ctx.token_index += 1;

        let initialization = if ctx.current_text() == Some(";") {
            ctx.token_index += 1;
            None
        } else {
            self.parse_statement(ctx)?.map(Box::new)
        };

        let condition = if ctx.current_text() == Some(";") {
            ctx.token_index += 1;
            None
        } else {
            let semicolon = self.find_statement_end(ctx)?;
            let expression = self.parse_expression(ctx, semicolon.wrapping_sub(1))?;
            ctx.token_index = semicolon + 1;
            Some(expression)
        };

        let close = self.find_closure(ctx, "(", ")")?;
        let increment = if ctx.token_index == close {
            None
        } else {
            Some(Box::new(self.parse_for_increment(ctx, close - 1)?))
        };
        ctx.token_index = close + 1;

        let loop_statement = Box::new(self.parse_substatement(ctx)?);

        ctx.release_bindings(ctx.scope_level);
        ctx.scope_level -= 1;

        Ok(Statement {
            kind: StatementKind::For {
                initialization,
                condition,
                increment,
                loop_statement,
            },
            line,
        })
    }

    /// For artirimi ';' ile degil kapatan ')' ile biter.
    fn parse_for_increment(
        &mut self,
        ctx: &mut ParsingContext,
        last_index: usize,
    ) -> Result<Statement, CompileError> {
        let line = ctx.line();
        let text = ctx.current_text().unwrap_or("").to_string();

        if text == "++" || text == "--" {
            ctx.token_index += 1;
            let statement = self.step_statement(ctx, &text, line)?;
            ctx.token_index += 1;
            return Ok(statement);
        }

        if ctx.kind_at(ctx.token_index) == Some(TokenKind::Identifier) {
            let next = ctx.text_at(ctx.token_index + 1).map(str::to_string);
            if let Some(op) = next {
                if (op == "++" || op == "--") && ctx.token_index + 1 <= last_index {
                    let statement = self.step_statement(ctx, &op, line)?;
                    ctx.token_index += 2;
                    return Ok(statement);
                }
            }
        }

        if let Some(operator_index) = self.find_assignment_operator(ctx, last_index) {
            return self.parse_assignment_parts(ctx, operator_index, last_index, line);
        }

        let expression = self.parse_expression(ctx, last_index)?;
        Ok(Statement {
            kind: StatementKind::Expression(expression),
            line,
        })
    }

    /// Index'in gosterdigi tanimlayicidan Increment/Decrement uretir;
    /// index ilerletilmez.
    fn step_statement(
        &self,
        ctx: &ParsingContext,
        operator: &str,
        line: u16,
    ) -> Result<Statement, CompileError> {
        let name = ctx.current_text().unwrap_or("").to_string();
        let identifier = Identifier::new(&name);
        let Some(usage) = self.resolve_binding(ctx, &identifier) else {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UndefinedVariable(name),
            ));
        };
        if !usage.ty.as_ref().map_or(false, |t| is_integer(t)) || usage.is_pointer() {
            return Err(CompileError::new(
                line,
                CompileErrorKind::NonIntegerValue(name),
            ));
        }
        let kind = if operator == "++" {
            StatementKind::Increment(identifier)
        } else {
            StatementKind::Decrement(identifier)
        };
        Ok(Statement { kind, line })
    }

    fn parse_statement_prefix_step(
        &mut self,
        ctx: &mut ParsingContext,
        operator: &str,
        line: u16,
    ) -> Result<Statement, CompileError> {
        ctx.token_index += 1;
        let statement = self.step_statement(ctx, operator, line)?;
        ctx.token_index += 1;
        if ctx.current_text() == Some(";") {
            ctx.token_index += 1;
        }
        Ok(statement)
    }

    fn parse_statement_break(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some(";") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("break".into())));
        }
        ctx.token_index += 1;
        Ok(Statement {
            kind: StatementKind::Break,
            line,
        })
    }

    fn parse_statement_continue(
        &mut self,
        ctx: &mut ParsingContext,
    ) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;
        if ctx.current_text() != Some(";") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol("continue".into())));
        }
        ctx.token_index += 1;
        Ok(Statement {
            kind: StatementKind::Continue,
            line,
        })
    }

    fn parse_statement_return(&mut self, ctx: &mut ParsingContext) -> Result<Statement, CompileError> {
        let line = ctx.line();
        ctx.token_index += 1;

        let expression = if ctx.current_text() == Some(";") {
            ctx.token_index += 1;
            None
        } else {
            let semicolon = self.find_statement_end(ctx)?;
            let expression = self.parse_expression(ctx, semicolon.wrapping_sub(1))?;
            ctx.token_index = semicolon + 1;
            Some(expression)
        };

        Ok(Statement {
            kind: StatementKind::Return(expression),
            line,
        })
    }

    fn parse_statement_identifier(
        &mut self,
        ctx: &mut ParsingContext,
    ) -> Result<Option<Statement>, CompileError> {
        let line = ctx.line();
        let leading_text = ctx.current_text().unwrap_or("").to_string();

        if let Some(type_usage) = self.parse_type_usage(ctx) {
            return self
                .parse_statement_declaration(ctx, type_usage, &leading_text, line)
                .map(Some);
        }

        if let Some(operator_index) = self.find_assignment_before_semicolon(ctx) {
            let semicolon = self.find_statement_end(ctx)?;
            let statement = self.parse_assignment_parts(ctx, operator_index, semicolon - 1, line)?;
            ctx.token_index = semicolon + 1;
            return Ok(Some(statement));
        }

        let next_kind = ctx.kind_at(ctx.token_index + 1);
        let next_text = ctx.text_at(ctx.token_index + 1).map(str::to_string);

        match (next_kind, next_text.as_deref()) {
            (Some(TokenKind::Punctuation), Some("(")) => {
                let function = self.resolve_function(ctx, &leading_text).ok_or_else(|| {
                    CompileError::new(line, CompileErrorKind::UndefinedVariable(leading_text.clone()))
                })?;
                ctx.token_index += 1;
                let arguments = self.parse_function_call_arguments(ctx)?;
                if ctx.current_text() == Some(";") {
                    ctx.token_index += 1;
                }
                Ok(Some(Statement {
                    kind: StatementKind::Expression(Expression::FunctionCall {
                        function,
                        arguments,
                    }),
                    line,
                }))
            }
            (Some(TokenKind::Punctuation), _) => {
                // uye zinciri: metot cagrisi ya da statik erisim
                let semicolon = self.find_statement_end(ctx)?;
                let expression = self.parse_expression(ctx, semicolon - 1)?;
                ctx.token_index = semicolon + 1;
                Ok(Some(Statement {
                    kind: StatementKind::Expression(expression),
                    line,
                }))
            }
            (Some(TokenKind::Operator), Some(op)) if op == "++" || op == "--" => {
                let statement = self.step_statement(ctx, op, line)?;
                ctx.token_index += 2;
                if ctx.current_text() == Some(";") {
                    ctx.token_index += 1;
                }
                Ok(Some(statement))
            }
            _ => Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(leading_text),
            )),
        }
    }

    /// Atama operatoru taramasi: ';' gorulene kadar, parantez seviyesi
    /// 0'da. 0 donmez; bulunamazsa None.
    fn find_assignment_before_semicolon(&self, ctx: &ParsingContext) -> Option<usize> {
        let mut parenthesis_level = 0i32;
        for i in ctx.token_index..ctx.tokens.len() {
            let text = ctx.text(i);
            if text == ";" {
                return None;
            }
            if ctx.tokens[i].kind == TokenKind::Operator
                && parenthesis_level == 0
                && ASSIGNMENT_OPERATORS.contains(&text)
            {
                return Some(i);
            }
            if text == "(" {
                parenthesis_level += 1;
            } else if text == ")" {
                parenthesis_level -= 1;
            }
        }
        None
    }

    fn find_assignment_operator(&self, ctx: &ParsingContext, last_index: usize) -> Option<usize> {
        let mut parenthesis_level = 0i32;
        for i in ctx.token_index..=last_index.min(ctx.tokens.len().saturating_sub(1)) {
            let text = ctx.text(i);
            if ctx.tokens[i].kind == TokenKind::Operator
                && parenthesis_level == 0
                && ASSIGNMENT_OPERATORS.contains(&text)
            {
                return Some(i);
            }
            if text == "(" {
                parenthesis_level += 1;
            } else if text == ")" {
                parenthesis_level -= 1;
            }
        }
        None
    }

    /// [index, operator) sol taraf, (operator, last] sag taraf.
    fn parse_assignment_parts(
        &mut self,
        ctx: &mut ParsingContext,
        operator_index: usize,
        last_index: usize,
        line: u16,
    ) -> Result<Statement, CompileError> {
        let operator = ctx.text(operator_index).to_string();
        let left = self.parse_expression(ctx, operator_index - 1)?;
        if !matches!(
            left,
            Expression::VariableAccess(_) | Expression::MemberAccess(_)
        ) {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(operator),
            ));
        }
        ctx.token_index = operator_index + 1;
        let right = self.parse_expression(ctx, last_index)?;
        Ok(Statement {
            kind: StatementKind::Assignment {
                left,
                right,
                operator,
            },
            line,
        })
    }

    fn parse_statement_declaration(
        &mut self,
        ctx: &mut ParsingContext,
        type_usage: TypeUsage,
        leading_text: &str,
        line: u16,
    ) -> Result<Statement, CompileError> {
        let Some(name_token) = ctx.tokens.get(ctx.token_index).cloned() else {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(leading_text.to_string()),
            ));
        };
        if name_token.kind != TokenKind::Identifier {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(leading_text.to_string()),
            ));
        }
        let identifier = Identifier::new(name_token.text(&ctx.source));
        ctx.token_index += 1;

        let next = ctx.current_text().map(str::to_string);
        match next.as_deref() {
            Some("=") => {
                self.check_redefinition(ctx, &identifier, line)?;
                ctx.token_index += 1;
                let semicolon = self.find_statement_end(ctx)?;
                let initial_value = self.parse_expression(ctx, semicolon - 1)?;
                ctx.token_index = semicolon + 1;
                ctx.bindings.push(Binding {
                    identifier: identifier.clone(),
                    type_usage: type_usage.clone(),
                    scope_level: ctx.scope_level,
                });
                Ok(Statement {
                    kind: StatementKind::VariableDeclaration {
                        type_usage,
                        identifier,
                        initial_value: Some(initial_value),
                    },
                    line,
                })
            }
            Some(";") => {
                self.check_redefinition(ctx, &identifier, line)?;
                if let Some(ty) = &type_usage.ty {
                    // kurucu olmayan aggregate baslatilamaz
                    if ty.kind != TypeKind::BuiltIn
                        && !type_usage.is_pointer()
                        && ty.default_constructor().is_none()
                    {
                        return Err(CompileError::new(
                            line,
                            CompileErrorKind::NoDefaultConstructor(ty.identifier.name.clone()),
                        ));
                    }
                }
                ctx.token_index += 1;
                ctx.bindings.push(Binding {
                    identifier: identifier.clone(),
                    type_usage: type_usage.clone(),
                    scope_level: ctx.scope_level,
                });
                Ok(Statement {
                    kind: StatementKind::VariableDeclaration {
                        type_usage,
                        identifier,
                        initial_value: None,
                    },
                    line,
                })
            }
            Some("(") => {
                self.parse_statement_function_declaration_named(ctx, type_usage, identifier, line)
            }
            _ => Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(leading_text.to_string()),
            )),
        }
    }

    fn check_redefinition(
        &self,
        ctx: &ParsingContext,
        identifier: &Identifier,
        line: u16,
    ) -> Result<(), CompileError> {
        if ctx.bindings.iter().any(|b| b.identifier == *identifier) {
            return Err(CompileError::new(
                line,
                CompileErrorKind::VariableRedefinition(identifier.name.clone()),
            ));
        }
        Ok(())
    }

    fn parse_statement_function_declaration(
        &mut self,
        ctx: &mut ParsingContext,
        return_type: TypeUsage,
        line: u16,
    ) -> Result<Statement, CompileError> {
        let Some(name_token) = ctx.tokens.get(ctx.token_index).cloned() else {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol("void".into()),
            ));
        };
        if name_token.kind != TokenKind::Identifier {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol("void".into()),
            ));
        }
        let identifier = Identifier::new(name_token.text(&ctx.source));
        ctx.token_index += 1;
        if ctx.current_text() != Some("(") {
            return Err(CompileError::new(
                line,
                CompileErrorKind::UnexpectedSymbol(identifier.name),
            ));
        }
        self.parse_statement_function_declaration_named(ctx, return_type, identifier, line)
    }

    fn parse_statement_function_declaration_named(
        &mut self,
        ctx: &mut ParsingContext,
        return_type: TypeUsage,
        identifier: Identifier,
        line: u16,
    ) -> Result<Statement, CompileError> {
        ctx.token_index += 1;

        let mut parameter_identifiers = Vec::new();
        let mut parameter_types = Vec::new();
        loop {
            if ctx.token_index >= ctx.tokens.len() {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UnexpectedSymbol(identifier.name.clone()),
                ));
            }
            if ctx.current_text() == Some(")") {
                ctx.token_index += 1;
                break;
            }
            let Some(parameter_type) = self.parse_type_usage(ctx) else {
                return Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
                    ctx.current_text().unwrap_or("").to_string(),
                )));
            };
            let Some(name_token) = ctx.tokens.get(ctx.token_index).cloned() else {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UnexpectedSymbol(identifier.name.clone()),
                ));
            };
            if name_token.kind != TokenKind::Identifier {
                return Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
                    name_token.text(&ctx.source).to_string(),
                )));
            }
            let parameter = Identifier::new(name_token.text(&ctx.source));
            ctx.token_index += 1;

            // parametreler govde scope'unda yasar
            ctx.bindings.push(Binding {
                identifier: parameter.clone(),
                type_usage: parameter_type.clone(),
                scope_level: ctx.scope_level + 1,
            });
            parameter_identifiers.push(parameter);
            parameter_types.push(parameter_type);

            if ctx.current_text() == Some(",") {
                ctx.token_index += 1;
            }
        }

        if ctx.current_text() != Some("{") {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol(identifier.name)));
        }
        let body = self.parse_statement_block(ctx)?;

        ctx.declared_functions.push(identifier.clone());
        Ok(Statement {
            kind: StatementKind::FunctionDeclaration(Rc::new(FunctionDeclaration {
                return_type,
                identifier,
                parameter_identifiers,
                parameter_types,
                body,
            })),
            line,
        })
    }

    /// Token akisindan tip yazimi okur: `A::B` zinciri + istege bagli
    /// `*` ya da `&`. Basarisizsa index'e dokunmaz.
    pub(crate) fn parse_type_usage(&self, ctx: &mut ParsingContext) -> Option<TypeUsage> {
        let cached_index = ctx.token_index;
        if ctx.kind_at(cached_index)? != TokenKind::Identifier {
            return None;
        }

        let mut index = cached_index;
        let mut name = ctx.text(index).to_string();
        while ctx.text_at(index + 1) == Some("::")
            && ctx.kind_at(index + 2) == Some(TokenKind::Identifier)
        {
            name.push_str("::");
            name.push_str(ctx.text(index + 2));
            index += 2;
        }

        let ty = self.find_type(ctx, &name)?;
        let mut type_usage = TypeUsage::of(ty);
        if cached_index > 0 && ctx.text(cached_index - 1) == "const" {
            type_usage.constant = true;
        }

        index += 1;
        match ctx.text_at(index) {
            Some("*") => {
                type_usage.pointer_level = 1;
                index += 1;
            }
            Some("&") => {
                type_usage.reference = true;
                index += 1;
            }
            _ => {}
        }

        ctx.token_index = index;
        Some(type_usage)
    }

    /// Tip cozumlemesi: once dogrudan isim, sonra using listesi sirayla.
    fn find_type(&self, ctx: &ParsingContext, name: &str) -> Option<TypeRef> {
        if let Some(ty) = self.global.get_type(name) {
            return Some(ty);
        }
        for namespace in &ctx.using_namespaces {
            if let Some(ty) = self.global.get_type(&format!("{}::{}", namespace, name)) {
                return Some(ty);
            }
        }
        None
    }

    /// Fonksiyon cozumlemesi using oneklerini de dener; bulunan nitelikli
    /// isim cagri ifadesine yazilir ki yurutme ayni yoldan bulsun.
    fn resolve_function(&self, ctx: &ParsingContext, name: &str) -> Option<Identifier> {
        if ctx.declared_functions.iter().any(|f| f.name == name)
            || self.global.get_function(name).is_some()
        {
            return Some(Identifier::new(name));
        }
        for namespace in &ctx.using_namespaces {
            let qualified = format!("{}::{}", namespace, name);
            if self.global.get_function(&qualified).is_some() {
                return Some(Identifier::new(qualified));
            }
        }
        None
    }

    fn resolve_binding(&self, ctx: &ParsingContext, identifier: &Identifier) -> Option<TypeUsage> {
        ctx.bindings
            .iter()
            .rev()
            .find(|b| b.identifier == *identifier)
            .map(|b| b.type_usage.clone())
            .or_else(|| {
                self.global
                    .retrieve_instance(identifier)
                    .map(|i| i.type_usage.clone())
            })
    }

    fn find_closure(
        &self,
        ctx: &ParsingContext,
        opening: &str,
        closing: &str,
    ) -> Result<usize, CompileError> {
        if ctx.current_text() == Some(closing) {
            return Ok(ctx.token_index);
        }
        let mut level = 0u32;
        for i in ctx.token_index + 1..ctx.tokens.len() {
            let text = ctx.text(i);
            if text == closing {
                if level == 0 {
                    return Ok(i);
                }
                level -= 1;
            } else if text == opening {
                level += 1;
            }
        }
        Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
            ctx.current_text().unwrap_or("").to_string(),
        )))
    }

    fn find_matching_parenthesis(
        &self,
        ctx: &ParsingContext,
        open_index: usize,
    ) -> Result<usize, CompileError> {
        let mut level = 0u32;
        for i in open_index + 1..ctx.tokens.len() {
            match ctx.text(i) {
                ")" => {
                    if level == 0 {
                        return Ok(i);
                    }
                    level -= 1;
                }
                "(" => level += 1,
                _ => {}
            }
        }
        Err(ctx.error(CompileErrorKind::UnexpectedSymbol("(".into())))
    }

    fn find_statement_end(&self, ctx: &ParsingContext) -> Result<usize, CompileError> {
        for i in ctx.token_index..ctx.tokens.len() {
            if ctx.text(i) == ";" {
                return Ok(i);
            }
        }
        Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
            ctx.current_text().unwrap_or("").to_string(),
        )))
    }

    /// Kapanis index'i dahil [token_index, last_index] araligini ifade
    /// olarak okur. Donuste index last_index + 1'dedir.
    pub(crate) fn parse_expression(
        &mut self,
        ctx: &mut ParsingContext,
        last_index: usize,
    ) -> Result<Expression, CompileError> {
        let first = ctx.token_index;
        if first > last_index || last_index >= ctx.tokens.len() {
            return Err(ctx.error(CompileErrorKind::UnexpectedSymbol(
                ctx.current_text().unwrap_or(";").to_string(),
            )));
        }
        let expression = self.parse_expression_inner(ctx, first, last_index)?;
        ctx.token_index = last_index + 1;
        Ok(expression)
    }

    fn parse_expression_inner(
        &mut self,
        ctx: &mut ParsingContext,
        first: usize,
        last_index: usize,
    ) -> Result<Expression, CompileError> {
        let token = ctx.tokens[first].clone();
        let text = token.text(&ctx.source).to_string();

        if first == last_index {
            return match token.kind {
                TokenKind::Number => Ok(Expression::Value(self.number_literal(&text))),
                TokenKind::String => Ok(Expression::Value(self.string_literal(&text))),
                TokenKind::Identifier => {
                    let identifier = Identifier::new(&text);
                    if self.resolve_binding(ctx, &identifier).is_none() {
                        return Err(CompileError::new(
                            token.line,
                            CompileErrorKind::UndefinedVariable(text),
                        ));
                    }
                    Ok(Expression::VariableAccess(identifier))
                }
                TokenKind::Keyword if text == "nullptr" => Ok(Expression::NullPointer),
                TokenKind::Keyword if text == "true" || text == "false" => {
                    Ok(Expression::Value(self.bool_literal(text == "true")))
                }
                _ => Err(CompileError::new(
                    token.line,
                    CompileErrorKind::UnexpectedSymbol(text),
                )),
            };
        }

        // parantez seviyesi 0'daki ILK operator ifadeyi boler; oncelik
        // gozetilmez, cagiran parantezler
        let mut parenthesis_level: u32 = if text == "(" { 1 } else { 0 };
        let mut operator_index = 0usize;
        for i in first + 1..last_index {
            let t = ctx.text(i);
            if ctx.tokens[i].kind == TokenKind::Operator && parenthesis_level == 0 {
                operator_index = i;
                break;
            }
            if t == "(" {
                parenthesis_level += 1;
            } else if t == ")" {
                parenthesis_level = parenthesis_level.saturating_sub(1);
            }
        }

        if operator_index > 0 {
            let operator = ctx.text(operator_index).to_string();
            let operator_line = ctx.tokens[operator_index].line;
            let left = self.parse_expression(ctx, operator_index - 1)?;

            // sol islenen kullanici tipindeyse operator metodu tanimli olmali
            let left_usage = self.expression_type_usage(ctx, &left);
            if let Some(ty) = &left_usage.ty {
                if ty.kind != TypeKind::BuiltIn && !left_usage.is_pointer() {
                    let method_name = format!("operator{}", operator);
                    if ty.method(&Identifier::new(&method_name)).is_none() {
                        return Err(CompileError::new(
                            operator_line,
                            CompileErrorKind::InvalidOperator(ty.identifier.name.clone()),
                        ));
                    }
                }
            }

            ctx.token_index = operator_index + 1;
            let right = self.parse_expression(ctx, last_index)?;
            return Ok(Expression::BinaryOperation {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            });
        }

        if text == "(" {
            let close = self.find_matching_parenthesis(ctx, first)?;
            ctx.token_index = first + 1;
            let inner = self.parse_expression(ctx, close.wrapping_sub(1))?;
            return Ok(Expression::Parenthesized(Box::new(inner)));
        }

        if token.kind == TokenKind::Identifier {
            let next_text = ctx.text_at(first + 1).map(str::to_string);
            match next_text.as_deref() {
                Some("(") => {
                    let function = self.resolve_function(ctx, &text).ok_or_else(|| {
                        CompileError::new(token.line, CompileErrorKind::UndefinedVariable(text.clone()))
                    })?;
                    ctx.token_index = first + 1;
                    let arguments = self.parse_function_call_arguments(ctx)?;
                    return Ok(Expression::FunctionCall {
                        function,
                        arguments,
                    });
                }
                Some(".") | Some("->") => {
                    let identifiers = self.parse_member_access(ctx)?;
                    if ctx.token_index <= last_index && ctx.current_text() == Some("(") {
                        let arguments = self.parse_function_call_arguments(ctx)?;
                        return Ok(Expression::MethodCall {
                            member_access: Box::new(Expression::MemberAccess(identifiers)),
                            arguments,
                        });
                    }
                    return Ok(Expression::MemberAccess(identifiers));
                }
                Some("::") => return self.parse_static_access(ctx, last_index),
                _ => {
                    return Err(CompileError::new(
                        token.line,
                        CompileErrorKind::UnexpectedSymbol(text),
                    ))
                }
            }
        }

        if token.kind == TokenKind::Operator && text == "&" {
            ctx.token_index = first + 1;
            let inner = self.parse_expression(ctx, last_index)?;
            return Ok(Expression::AddressOf(Box::new(inner)));
        }

        Err(CompileError::new(
            token.line,
            CompileErrorKind::UnexpectedSymbol(text),
        ))
    }

    /// `A::B::isim` zinciri: ardindan '(' geliyorsa nitelikli fonksiyon
    /// cagrisi, degilse statik degisken erisimi.
    fn parse_static_access(
        &mut self,
        ctx: &mut ParsingContext,
        last_index: usize,
    ) -> Result<Expression, CompileError> {
        let line = ctx.line();
        let mut name = ctx.current_text().unwrap_or("").to_string();
        while ctx.text_at(ctx.token_index + 1) == Some("::") {
            let Some(segment) = ctx.text_at(ctx.token_index + 2).map(str::to_string) else {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UnexpectedSymbol(name),
                ));
            };
            name.push_str("::");
            name.push_str(&segment);
            ctx.token_index += 2;
        }
        ctx.token_index += 1;

        if ctx.token_index <= last_index && ctx.current_text() == Some("(") {
            if self.global.get_function(&name).is_none() {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UndefinedVariable(name),
                ));
            }
            let arguments = self.parse_function_call_arguments(ctx)?;
            Ok(Expression::FunctionCall {
                function: Identifier::new(name),
                arguments,
            })
        } else {
            let identifier = Identifier::new(&name);
            if self.global.retrieve_instance(&identifier).is_none() {
                return Err(CompileError::new(
                    line,
                    CompileErrorKind::UndefinedVariable(name),
                ));
            }
            Ok(Expression::VariableAccess(identifier))
        }
    }

    /// Nokta/ok zincirini okur ve her adimi dogrular: uye listesi,
    /// pointer'da '->' / degerde '.' kurali. Son eleman '(' ile devam
    /// ediyorsa metot adi olarak denetlenir.
    fn parse_member_access(
        &self,
        ctx: &mut ParsingContext,
    ) -> Result<Vec<Identifier>, CompileError> {
        let mut identifiers: Vec<Identifier> = Vec::new();
        let mut type_usage = TypeUsage::default();

        loop {
            let next_text = ctx.text_at(ctx.token_index + 1).map(str::to_string);
            let dot_access = next_text.as_deref() == Some(".");
            let arrow_access = next_text.as_deref() == Some("->");
            let more = dot_access || arrow_access;

            let name = ctx.current_text().unwrap_or("").to_string();
            let identifier = Identifier::new(&name);

            if identifiers.is_empty() {
                let Some(usage) = self.resolve_binding(ctx, &identifier) else {
                    return Err(ctx.error(CompileErrorKind::UndefinedVariable(name)));
                };
                type_usage = usage;
            } else if next_text.as_deref() == Some("(") {
                let known = type_usage
                    .ty
                    .as_ref()
                    .map_or(false, |t| t.method(&identifier).is_some());
                if !known {
                    return Err(ctx.error(CompileErrorKind::MissingMember(name)));
                }
                type_usage = TypeUsage::default();
            } else {
                let member = type_usage.ty.as_ref().and_then(|t| t.member(&identifier));
                match member {
                    Some(member) => type_usage = member.type_usage.clone(),
                    None => return Err(ctx.error(CompileErrorKind::MissingMember(name))),
                }
            }
            identifiers.push(identifier);

            if more {
                if type_usage.is_pointer() && dot_access {
                    return Err(ctx.error(CompileErrorKind::InvalidMemberAccessOperatorPtr(name)));
                }
                if !type_usage.is_pointer() && arrow_access {
                    return Err(
                        ctx.error(CompileErrorKind::InvalidMemberAccessOperatorNonPtr(name))
                    );
                }
            }

            ctx.token_index += 1;
            if more {
                ctx.token_index += 1;
            } else {
                break;
            }
        }

        Ok(identifiers)
    }

    /// Giris '(' uzerinde; cikis kapanisin arkasinda. Argumanlar seviye
    /// 0'daki virgullerden bolunur.
    fn parse_function_call_arguments(
        &mut self,
        ctx: &mut ParsingContext,
    ) -> Result<Vec<Expression>, CompileError> {
        let open_index = ctx.token_index;
        let close = self.find_matching_parenthesis(ctx, open_index)?;
        ctx.token_index = open_index + 1;

        let mut arguments = Vec::new();
        while ctx.token_index < close {
            let mut end = close;
            let mut level = 0u32;
            for i in ctx.token_index..close {
                match ctx.text(i) {
                    "," if level == 0 => {
                        end = i;
                        break;
                    }
                    "(" => level += 1,
                    ")" => level = level.saturating_sub(1),
                    _ => {}
                }
            }
            let argument = self.parse_expression(ctx, end - 1)?;
            arguments.push(argument);
            ctx.token_index = end + 1;
        }

        ctx.token_index = close + 1;
        Ok(arguments)
    }

    /// Parse zamani tip bilgisi; operator metodu denetimi icin yeterli.
    fn expression_type_usage(&self, ctx: &ParsingContext, expression: &Expression) -> TypeUsage {
        match expression {
            Expression::Value(value) => value.type_usage.clone(),
            Expression::VariableAccess(identifier) => {
                self.resolve_binding(ctx, identifier).unwrap_or_default()
            }
            Expression::BinaryOperation { left, .. } => self.expression_type_usage(ctx, left),
            Expression::Parenthesized(inner) => self.expression_type_usage(ctx, inner),
            Expression::AddressOf(inner) => {
                let mut usage = self.expression_type_usage(ctx, inner);
                usage.pointer_level += 1;
                usage
            }
            Expression::FunctionCall { function, .. } => self
                .global
                .get_function(&function.name)
                .map(|f| f.borrow().return_type.clone())
                .unwrap_or_default(),
            _ => TypeUsage::default(),
        }
    }

    fn number_literal(&self, text: &str) -> Value {
        if text.contains('.') {
            if text.ends_with('f') {
                let number: f32 = text.trim_end_matches('f').parse().unwrap_or(0.0);
                let mut value = Value::with_heap(self.builtin_usage("float"));
                value.write::<f32>(number);
                value
            } else {
                let number: f64 = text.parse().unwrap_or(0.0);
                let mut value = Value::with_heap(self.builtin_usage("double"));
                value.write::<f64>(number);
                value
            }
        } else if text.ends_with('u') {
            let number: u32 = text.trim_end_matches('u').parse().unwrap_or(0);
            let mut value = Value::with_heap(self.builtin_usage("uint32_t"));
            value.write::<u32>(number);
            value
        } else {
            let number: i32 = text.parse().unwrap_or(0);
            let mut value = Value::with_heap(self.builtin_usage("int"));
            value.write::<i32>(number);
            value
        }
    }

    fn bool_literal(&self, value: bool) -> Value {
        let mut out = Value::with_heap(self.builtin_usage("bool"));
        out.write::<u8>(value as u8);
        out
    }

    /// Dizge literali havuza kopyalanir; deger havuzdaki NUL sonlu
    /// diziye isaret eden bir `const char*` tasir.
    fn string_literal(&mut self, raw: &str) -> Value {
        let inner = if raw.len() >= 2 {
            &raw[1..raw.len() - 1]
        } else {
            ""
        };
        let unescaped = unescape(inner);
        let pointer = self.literal_strings.intern(&unescaped);
        let mut value = Value::with_heap(self.char_pointer_usage.clone());
        value.write::<*const u8>(pointer);
        value
    }

    fn builtin_usage(&self, name: &str) -> TypeUsage {
        TypeUsage {
            ty: self.global.get_type(name),
            ..Default::default()
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
