//! Evaluator: AST uzerinde yurur, degerleri uretir ve host cagrilarini
//! surer. Scope'lar watermark ile acilip kapanir; Break/Continue/Return
//! jump durumu olarak tasinir.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expression, FunctionDeclaration, Statement, StatementKind};
use crate::environment::Environment;
use crate::errors::{RuntimeError, RuntimeErrorKind};
use crate::namespace::Instance;
use crate::types::{is_integer, FunctionBody, Identifier, Type, TypeKind, TypeUsage};
use crate::value::{BufferKind, StackPool, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpStatement {
    None,
    Break,
    Continue,
    Return,
}

/// Yurutme durumu. Stack arena'si Rc'dir: instance degerleri scope
/// kapanana kadar arena diliminin sahibi kalir.
pub struct ExecutionContext {
    pub scope_level: u32,
    pub current_line: u16,
    pub jump_statement: JumpStatement,
    pub return_value: Value,
    pub stack: Rc<RefCell<StackPool>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            scope_level: 0,
            current_line: 0,
            jump_statement: JumpStatement::None,
            return_value: Value::new(),
            stack: Rc::new(RefCell::new(StackPool::new())),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

type ExecResult = Result<(), RuntimeError>;

impl Environment {
    pub(crate) fn execute_program(
        &mut self,
        ctx: &mut ExecutionContext,
        statements: &[Rc<Statement>],
    ) -> ExecResult {
        for statement in statements {
            self.execute_statement(ctx, statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, ctx: &mut ExecutionContext, statement: &Statement) -> ExecResult {
        ctx.current_line = statement.line;

        match &statement.kind {
            StatementKind::Expression(expression) => {
                let mut unused = Value::new();
                self.get_value(ctx, expression, &mut unused)
            }
            StatementKind::Block(statements) => {
                ctx.scope_level += 1;
                let mut result = Ok(());
                for statement in statements {
                    result = self.execute_statement(ctx, statement);
                    if result.is_err() || ctx.jump_statement != JumpStatement::None {
                        break;
                    }
                }
                self.global.release_instances(ctx.scope_level);
                ctx.scope_level -= 1;
                result
            }
            StatementKind::UsingDirective(_) | StatementKind::NamespaceDeclaration => Ok(()),
            StatementKind::VariableDeclaration {
                type_usage,
                identifier,
                initial_value,
            } => self.execute_variable_declaration(ctx, type_usage, identifier, initial_value.as_ref()),
            StatementKind::FunctionDeclaration(declaration) => {
                self.execute_function_declaration(declaration);
                Ok(())
            }
            StatementKind::Assignment {
                left,
                right,
                operator,
            } => {
                let mut instance_data = Value::new();
                self.get_instance_data_value(ctx, left, &mut instance_data)?;
                let mut right_value = Value::new();
                self.get_value(ctx, right, &mut right_value)?;
                perform_assignment(&right_value, operator, &mut instance_data);
                Ok(())
            }
            StatementKind::Increment(identifier) => {
                if let Some(instance) = self.global.retrieve_instance_mut(identifier) {
                    let current = get_value_as_integer(&instance.value);
                    set_value_as_integer(current + 1, &mut instance.value);
                }
                Ok(())
            }
            StatementKind::Decrement(identifier) => {
                if let Some(instance) = self.global.retrieve_instance_mut(identifier) {
                    let current = get_value_as_integer(&instance.value);
                    set_value_as_integer(current - 1, &mut instance.value);
                }
                Ok(())
            }
            StatementKind::If {
                condition,
                then_statement,
                else_statement,
            } => {
                let mut condition_value = Value::new();
                self.get_value(ctx, condition, &mut condition_value)?;
                if read_bool(&condition_value) {
                    self.execute_statement(ctx, then_statement)
                } else if let Some(else_statement) = else_statement {
                    self.execute_statement(ctx, else_statement)
                } else {
                    Ok(())
                }
            }
            StatementKind::While {
                condition,
                loop_statement,
            } => {
                let mut condition_value = Value::new();
                self.get_value(ctx, condition, &mut condition_value)?;
                let mut condition_met = read_bool(&condition_value);

                while condition_met {
                    if ctx.jump_statement == JumpStatement::Continue {
                        ctx.jump_statement = JumpStatement::None;
                    }

                    self.execute_statement(ctx, loop_statement)?;

                    if ctx.jump_statement == JumpStatement::Break {
                        ctx.jump_statement = JumpStatement::None;
                        break;
                    }
                    if ctx.jump_statement == JumpStatement::Return {
                        break;
                    }

                    self.get_value(ctx, condition, &mut condition_value)?;
                    condition_met = read_bool(&condition_value);
                }
                Ok(())
            }
            StatementKind::For {
                initialization,
                condition,
                increment,
                loop_statement,
            } => {
                ctx.scope_level += 1;
                let result = self.execute_for(
                    ctx,
                    initialization.as_deref(),
                    condition.as_ref(),
                    increment.as_deref(),
                    loop_statement,
                );
                self.global.release_instances(ctx.scope_level);
                ctx.scope_level -= 1;
                result
            }
            StatementKind::Break => {
                ctx.jump_statement = JumpStatement::Break;
                Ok(())
            }
            StatementKind::Continue => {
                ctx.jump_statement = JumpStatement::Continue;
                Ok(())
            }
            StatementKind::Return(expression) => {
                if let Some(expression) = expression {
                    let mut return_value = std::mem::take(&mut ctx.return_value);
                    self.get_value(ctx, expression, &mut return_value)?;
                    ctx.return_value = return_value;
                }
                ctx.jump_statement = JumpStatement::Return;
                Ok(())
            }
        }
    }

    fn execute_for(
        &mut self,
        ctx: &mut ExecutionContext,
        initialization: Option<&Statement>,
        condition: Option<&Expression>,
        increment: Option<&Statement>,
        loop_statement: &Statement,
    ) -> ExecResult {
        if let Some(initialization) = initialization {
            self.execute_statement(ctx, initialization)?;
        }

        let mut condition_value = Value::new();
        let mut condition_met = true;
        if let Some(condition) = condition {
            self.get_value(ctx, condition, &mut condition_value)?;
            condition_met = read_bool(&condition_value);
        }

        while condition_met {
            if ctx.jump_statement == JumpStatement::Continue {
                ctx.jump_statement = JumpStatement::None;
            }

            self.execute_statement(ctx, loop_statement)?;

            if ctx.jump_statement == JumpStatement::Break {
                ctx.jump_statement = JumpStatement::None;
                break;
            }
            if ctx.jump_statement == JumpStatement::Return {
                break;
            }

            if let Some(increment) = increment {
                self.execute_statement(ctx, increment)?;
            }
            if let Some(condition) = condition {
                self.get_value(ctx, condition, &mut condition_value)?;
                condition_met = read_bool(&condition_value);
            }
        }
        Ok(())
    }

    /// Bildirim ayni scope seviyesinde var olan instance'i yeniden
    /// baslatir (program yeniden yuklemesi), yoksa yenisini kaydeder.
    fn execute_variable_declaration(
        &mut self,
        ctx: &mut ExecutionContext,
        type_usage: &TypeUsage,
        identifier: &Identifier,
        initial_value: Option<&Expression>,
    ) -> ExecResult {
        let exists_at_level = self
            .global
            .retrieve_instance(identifier)
            .map_or(false, |i| i.scope_level == ctx.scope_level);

        if !exists_at_level {
            let mut value = Value::new();
            if !type_usage.is_reference() {
                value.init_on_stack(type_usage.clone(), &ctx.stack);
            }
            self.global.register_instance(Instance {
                type_usage: type_usage.clone(),
                identifier: identifier.clone(),
                scope_level: ctx.scope_level,
                value,
            });
        } else if let Some(instance) = self.global.retrieve_instance_mut(identifier) {
            instance.type_usage = type_usage.clone();
            if !type_usage.is_reference() {
                instance.value.init_on_heap(type_usage.clone());
            }
        }

        if let Some(initial_value) = initial_value {
            let mut evaluated = Value::new();
            self.get_value(ctx, initial_value, &mut evaluated)?;
            if let Some(instance) = self.global.retrieve_instance_mut(identifier) {
                if instance.type_usage.is_reference() {
                    // referans bildirimi kaynagin depolamasina baglanir
                    let mut bound = evaluated.view();
                    bound.type_usage = instance.type_usage.clone();
                    instance.value = bound;
                } else {
                    write_value(&mut instance.value, &evaluated);
                }
            }
            return Ok(());
        }

        // baslatilmamis aggregate: varsayilan kurucu cagrilir
        let Some(ty) = &type_usage.ty else {
            return Ok(());
        };
        if ty.kind == TypeKind::BuiltIn || type_usage.is_pointer() {
            return Ok(());
        }
        let Some(constructor) = ty.default_constructor() else {
            return Ok(());
        };
        let mut this_pointer = Value::new();
        match self.global.retrieve_instance(identifier) {
            Some(instance) => get_address_of_value(&instance.value, &mut this_pointer),
            None => return Ok(()),
        }
        (constructor.body)(&this_pointer, &mut [], None);
        Ok(())
    }

    /// Ayni isimli betik fonksiyonu yeniden bildirilirse govdesi
    /// degistirilir; host kayitlari dokunulmadan kalir.
    fn execute_function_declaration(&mut self, declaration: &Rc<FunctionDeclaration>) {
        if let Some(functions) = self.global.get_functions(&declaration.identifier.name) {
            if let Some(existing) = functions
                .iter()
                .find(|f| matches!(f.borrow().body, FunctionBody::Script(_)))
            {
                let mut function = existing.borrow_mut();
                function.return_type = declaration.return_type.clone();
                function.parameters = declaration.parameter_types.clone();
                function.body = FunctionBody::Script(Rc::clone(declaration));
                return;
            }
        }

        let function = self.global.register_function(&declaration.identifier.name);
        let mut function = function.borrow_mut();
        function.return_type = declaration.return_type.clone();
        function.parameters = declaration.parameter_types.clone();
        function.body = FunctionBody::Script(Rc::clone(declaration));
    }

    /// Rvalue degerlendirme: `out` baslatilmissa ve boyut uyusuyorsa
    /// uzerine yazilir, degilse kaynagin gorunumu olur.
    pub(crate) fn get_value(
        &mut self,
        ctx: &mut ExecutionContext,
        expression: &Expression,
        out: &mut Value,
    ) -> ExecResult {
        match expression {
            Expression::Value(value) => {
                write_value(out, value);
                Ok(())
            }
            Expression::NullPointer => {
                if !out.is_initialized() {
                    out.init_on_heap(TypeUsage {
                        pointer_level: 1,
                        ..Default::default()
                    });
                }
                out.write::<usize>(0);
                Ok(())
            }
            Expression::VariableAccess(identifier) => {
                if let Some(instance) = self.global.retrieve_instance(identifier) {
                    if instance.value.is_initialized() {
                        let source = instance.value.view();
                        write_value(out, &source);
                    }
                }
                Ok(())
            }
            Expression::MemberAccess(_) => {
                let mut instance_data = Value::new();
                self.get_instance_data_value(ctx, expression, &mut instance_data)?;
                if instance_data.is_initialized() {
                    write_value(out, &instance_data);
                }
                Ok(())
            }
            Expression::BinaryOperation {
                left,
                right,
                operator,
            } => {
                let mut left_value = Value::new();
                self.get_value(ctx, left, &mut left_value)?;
                let mut right_value = Value::new();
                self.get_value(ctx, right, &mut right_value)?;
                self.apply_binary_operator(ctx, &left_value, &right_value, operator, out)
            }
            Expression::Parenthesized(inner) => self.get_value(ctx, inner, out),
            Expression::AddressOf(inner) => {
                if let Expression::VariableAccess(identifier) = inner.as_ref() {
                    if let Some(instance) = self.global.retrieve_instance(identifier) {
                        if instance.value.is_initialized() {
                            get_address_of_value(&instance.value, out);
                        }
                    }
                }
                Ok(())
            }
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                let Some(function) = self.global.get_function(&function.name) else {
                    return Ok(());
                };
                let (parameters, return_type, body) = {
                    let function = function.borrow();
                    (
                        function.parameters.clone(),
                        function.return_type.clone(),
                        function.body.clone(),
                    )
                };
                let mut argument_values = self.get_argument_values(ctx, &parameters, arguments)?;

                // const cikti, const olmayan donus: yazma icin gecici ac
                let out_is_const = out.type_usage.constant;
                let return_is_const = return_type.constant;
                if out_is_const && !return_is_const {
                    out.type_usage.constant = false;
                }

                let result = self.invoke_function(
                    ctx,
                    &body,
                    &return_type,
                    &mut argument_values,
                    Some(&mut *out),
                );

                if out_is_const && !return_is_const {
                    out.type_usage.constant = true;
                }
                result
            }
            Expression::MethodCall {
                member_access,
                arguments,
            } => {
                let mut instance_data = Value::new();
                self.get_instance_data_value(ctx, member_access, &mut instance_data)?;

                let Expression::MemberAccess(identifiers) = member_access.as_ref() else {
                    return Ok(());
                };
                let Some(method_identifier) = identifiers.last() else {
                    return Ok(());
                };
                let Some(ty) = instance_data.type_usage.ty.clone() else {
                    return Ok(());
                };
                let Some(method) = ty.method(method_identifier) else {
                    return Ok(());
                };

                // this: deger zaten pointer'sa kopyalanir, degilse adresi alinir
                let mut this_pointer = Value::new();
                if instance_data.type_usage.is_pointer() {
                    this_pointer.init_on_stack(instance_data.type_usage.clone(), &ctx.stack);
                    this_pointer.set_from(instance_data.data_ptr());
                } else {
                    get_address_of_value(&instance_data, &mut this_pointer);
                }

                let mut argument_values =
                    self.get_argument_values(ctx, &method.parameters, arguments)?;

                if method.return_type.ty.is_some() || method.return_type.is_pointer() {
                    assert_value_initialization(&method.return_type, out);
                }
                (method.body)(&this_pointer, &mut argument_values, Some(out));
                Ok(())
            }
        }
    }

    /// Lvalue yuruyusu: degisken ya da uye zinciri, instance verisine
    /// bakan bir gorunum uretir. Null pointer her atlamadan once yakalanir.
    fn get_instance_data_value(
        &self,
        ctx: &ExecutionContext,
        expression: &Expression,
        out: &mut Value,
    ) -> ExecResult {
        match expression {
            Expression::VariableAccess(identifier) => {
                if let Some(instance) = self.global.retrieve_instance(identifier) {
                    if instance.value.is_initialized() {
                        *out = instance.value.view();
                    }
                }
                Ok(())
            }
            Expression::MemberAccess(identifiers) => {
                let Some(first) = identifiers.first() else {
                    return Ok(());
                };
                let Some(instance) = self.global.retrieve_instance(first) else {
                    return Ok(());
                };
                if !instance.value.is_initialized() {
                    return Ok(());
                }
                *out = instance.value.view();

                if out.type_usage.is_pointer() && out.read::<usize>() == 0 {
                    return Err(RuntimeError::new(
                        ctx.current_line,
                        RuntimeErrorKind::NullPointerAccess(first.name.clone()),
                    ));
                }

                for identifier in &identifiers[1..] {
                    let Some(ty) = out.type_usage.ty.clone() else {
                        break;
                    };
                    let Some(member) = ty.member(identifier) else {
                        // uye degil: zincirin sonu bir metot adi
                        break;
                    };

                    let base_pointer = if out.type_usage.is_pointer() {
                        out.read::<*mut u8>()
                    } else {
                        out.data_ptr()
                    };
                    // SAFETY: offset kayit sirasinda host yerlesiminden alinmistir.
                    let member_pointer = unsafe { base_pointer.add(member.offset as usize) };
                    out.init_external(member.type_usage.clone(), member_pointer);

                    if out.type_usage.is_pointer() && out.read::<usize>() == 0 {
                        return Err(RuntimeError::new(
                            ctx.current_line,
                            RuntimeErrorKind::NullPointerAccess(member.identifier.name.clone()),
                        ));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Arguman hazirlama: referans parametreler kaynagin gorunumunu
    /// alir (caller depolamasi aliaslanir), deger parametreleri heap
    /// kopyasina donusturulur.
    fn get_argument_values(
        &mut self,
        ctx: &mut ExecutionContext,
        parameters: &[TypeUsage],
        expressions: &[Expression],
    ) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(expressions.len());
        for (i, expression) in expressions.iter().enumerate() {
            let mut value = Value::new();
            self.get_value(ctx, expression, &mut value)?;

            let by_reference = parameters.get(i).map_or(false, |p| p.is_reference());
            if by_reference {
                value.type_usage.reference = true;
            } else if value.buffer_kind() == BufferKind::External {
                value = value.to_heap_owned();
            }
            values.push(value);
        }
        Ok(values)
    }

    fn invoke_function(
        &mut self,
        ctx: &mut ExecutionContext,
        body: &FunctionBody,
        return_type: &TypeUsage,
        arguments: &mut [Value],
        out: Option<&mut Value>,
    ) -> ExecResult {
        match body {
            FunctionBody::Unbound => Ok(()),
            FunctionBody::Native(native) => {
                if let Some(out) = out {
                    if return_type.ty.is_some() || return_type.is_pointer() {
                        assert_value_initialization(return_type, out);
                    }
                    native(arguments, Some(out));
                } else {
                    native(arguments, None);
                }
                Ok(())
            }
            FunctionBody::Script(declaration) => {
                // parametreler cagri scope'unun bir ustunde yasar; govde
                // blogu ayni seviyeyi acip kapatinca serbest kalirlar
                for (i, (identifier, parameter_type)) in declaration
                    .parameter_identifiers
                    .iter()
                    .zip(&declaration.parameter_types)
                    .enumerate()
                {
                    let Some(argument) = arguments.get(i) else {
                        break;
                    };
                    let mut value = Value::new();
                    if parameter_type.is_reference() {
                        value = argument.view();
                    } else {
                        value.init_on_stack(parameter_type.clone(), &ctx.stack);
                        value.set_from(argument.data_ptr());
                    }
                    self.global.register_instance(Instance {
                        type_usage: parameter_type.clone(),
                        identifier: identifier.clone(),
                        scope_level: ctx.scope_level + 1,
                        value,
                    });
                }

                self.execute_statement(ctx, &declaration.body)?;

                if declaration.return_type.ty.is_some() || declaration.return_type.is_pointer() {
                    if let Some(out) = out {
                        if ctx.return_value.is_initialized() {
                            let return_usage = ctx.return_value.type_usage.clone();
                            assert_value_initialization(&return_usage, out);
                            out.set_from(ctx.return_value.data_ptr());
                        }
                    }
                }

                ctx.jump_statement = JumpStatement::None;
                Ok(())
            }
        }
    }

    /// Built-in (ve pointer) solda: tamsayi ya da ondalik yol; aksi
    /// halde kayitli `operatorX` metodu cagrilir.
    fn apply_binary_operator(
        &mut self,
        ctx: &mut ExecutionContext,
        left: &Value,
        right: &Value,
        operator: &str,
        out: &mut Value,
    ) -> ExecResult {
        let Some(left_type) = left.type_usage.ty.clone() else {
            return Ok(());
        };

        if left_type.kind == TypeKind::BuiltIn || left.type_usage.is_pointer() {
            let integer_values = is_integer(&left_type) || left.type_usage.is_pointer();

            let left_integer = get_value_as_integer(left);
            let right_integer = get_value_as_integer(right);
            let left_decimal = get_value_as_decimal(left);
            let right_decimal = get_value_as_decimal(right);

            let write_bool = |out: &mut Value, result: bool| {
                assert_value_initialization(&self.bool_usage, out);
                out.write::<u8>(result as u8);
            };

            match operator {
                "==" => write_bool(out, left_integer == right_integer),
                "!=" => write_bool(out, left_integer != right_integer),
                "<" => write_bool(
                    out,
                    if integer_values {
                        left_integer < right_integer
                    } else {
                        left_decimal < right_decimal
                    },
                ),
                ">" => write_bool(
                    out,
                    if integer_values {
                        left_integer > right_integer
                    } else {
                        left_decimal > right_decimal
                    },
                ),
                "<=" => write_bool(
                    out,
                    if integer_values {
                        left_integer <= right_integer
                    } else {
                        left_decimal <= right_decimal
                    },
                ),
                ">=" => write_bool(
                    out,
                    if integer_values {
                        left_integer >= right_integer
                    } else {
                        left_decimal >= right_decimal
                    },
                ),
                "&&" => write_bool(out, left_integer != 0 && right_integer != 0),
                "||" => write_bool(out, left_integer != 0 || right_integer != 0),
                "+" => {
                    assert_value_initialization(&left.type_usage, out);
                    if integer_values {
                        set_value_as_integer(left_integer + right_integer, out);
                    } else {
                        set_value_as_decimal(left_decimal + right_decimal, out);
                    }
                }
                "-" => {
                    assert_value_initialization(&left.type_usage, out);
                    if integer_values {
                        set_value_as_integer(left_integer - right_integer, out);
                    } else {
                        set_value_as_decimal(left_decimal - right_decimal, out);
                    }
                }
                "*" => {
                    assert_value_initialization(&left.type_usage, out);
                    if integer_values {
                        set_value_as_integer(left_integer * right_integer, out);
                    } else {
                        set_value_as_decimal(left_decimal * right_decimal, out);
                    }
                }
                "/" => {
                    assert_value_initialization(&left.type_usage, out);
                    if integer_values {
                        if right_integer == 0 {
                            return Err(RuntimeError::new(
                                ctx.current_line,
                                RuntimeErrorKind::DivisionByZero,
                            ));
                        }
                        set_value_as_integer(left_integer / right_integer, out);
                    } else {
                        if right_decimal.abs() <= 0.000000001 {
                            return Err(RuntimeError::new(
                                ctx.current_line,
                                RuntimeErrorKind::DivisionByZero,
                            ));
                        }
                        set_value_as_decimal(left_decimal / right_decimal, out);
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        // kullanici tipi: parse asamasi metodun varligini garanti etti
        let method_name = format!("operator{}", operator);
        let Some(method) = left_type.method(&Identifier::new(&method_name)) else {
            return Ok(());
        };

        let mut this_pointer = Value::new();
        get_address_of_value(left, &mut this_pointer);

        assert_value_initialization(&method.return_type, out);

        let mut call_arguments = vec![right.to_heap_owned()];
        (method.body)(&this_pointer, &mut call_arguments, Some(out));
        Ok(())
    }
}

/// `out` baslatilmis ve boyutu uyuyorsa byte kopyasi; degilse kaynak
/// gorunumu ile degistirilir.
pub(crate) fn write_value(out: &mut Value, source: &Value) {
    if out.is_initialized() && out.type_usage.get_size() == source.type_usage.get_size() {
        out.set_from(source.data_ptr());
    } else {
        *out = source.view();
    }
}

fn perform_assignment(value: &Value, operator: &str, instance_data: &mut Value) {
    // yalnizca '=' uygulanir; bilesik atamalar kabul edilip yoksayilir
    if operator != "=" || !instance_data.is_initialized() || !value.is_initialized() {
        return;
    }
    let size = value.type_usage.get_size();
    if size > 0 {
        // SAFETY: iki buffer da en az size byte tasir.
        unsafe { std::ptr::copy_nonoverlapping(value.data_ptr(), instance_data.data_ptr(), size) };
    }
}

fn get_address_of_value(source: &Value, out: &mut Value) {
    let mut pointer_usage = source.type_usage.clone();
    pointer_usage.pointer_level += 1;
    pointer_usage.reference = false;

    assert_value_initialization(&pointer_usage, out);
    out.write::<*mut u8>(source.data_ptr());
}

fn assert_value_initialization(type_usage: &TypeUsage, out: &mut Value) {
    if !out.is_initialized() || !out.type_usage.compatible_with(type_usage) {
        out.init_on_heap(type_usage.clone());
    }
}

fn read_bool(value: &Value) -> bool {
    value.is_initialized() && value.read::<u8>() != 0
}

/// Tip boyutuna gore isaretli okuma; pointer'lar her zaman makine
/// kelimesi olarak okunur.
fn get_value_as_integer(value: &Value) -> i64 {
    if !value.is_initialized() {
        return 0;
    }
    if value.type_usage.is_pointer() {
        return value.read::<usize>() as i64;
    }
    match value.type_usage.ty.as_ref().map(|t| Type::size(t)).unwrap_or(0) {
        1 => i64::from(value.read::<i8>()),
        2 => i64::from(value.read::<i16>()),
        4 => i64::from(value.read::<i32>()),
        8 => value.read::<i64>(),
        _ => 0,
    }
}

fn get_value_as_decimal(value: &Value) -> f64 {
    if !value.is_initialized() {
        return 0.0;
    }
    match value.type_usage.ty.as_ref().map(|t| Type::size(t)).unwrap_or(0) {
        4 => f64::from(value.read::<f32>()),
        8 => value.read::<f64>(),
        _ => 0.0,
    }
}

/// Hedef tip genisligine gore keserek yazar.
fn set_value_as_integer(integer: i64, out: &mut Value) {
    if out.type_usage.is_pointer() {
        out.write::<usize>(integer as usize);
        return;
    }
    match out.type_usage.ty.as_ref().map(|t| Type::size(t)).unwrap_or(0) {
        1 => out.write::<i8>(integer as i8),
        2 => out.write::<i16>(integer as i16),
        4 => out.write::<i32>(integer as i32),
        8 => out.write::<i64>(integer),
        _ => {}
    }
}

fn set_value_as_decimal(decimal: f64, out: &mut Value) {
    match out.type_usage.ty.as_ref().map(|t| Type::size(t)).unwrap_or(0) {
        4 => out.write::<f32>(decimal as f32),
        8 => out.write::<f64>(decimal),
        _ => {}
    }
}
