//! Environment: kayit API'si, program deposu ve yukleme hatti.
//!
//! Host once tiplerini ve fonksiyonlarini kaydeder, sonra `load` ile
//! betik calistirir. Yukleme hatti: preprocess -> tokenize -> parse ->
//! execute. Ayni isimle yeniden yukleme AST'yi yeniler.

use std::collections::HashMap;
use std::mem;

use crate::ast::Program;
use crate::errors::ScriptError;
use crate::interpreter::{ExecutionContext, JumpStatement};
use crate::namespace::Namespace;
use crate::parser::ParsingContext;
use crate::preprocessor::preprocess;
use crate::tokenizer::tokenize;
use crate::types::{hash, FunctionRef, Identifier, TypeKind, TypeRef, TypeUsage};
use crate::value::{LiteralStringsPool, Value};

pub struct Environment {
    pub(crate) global: Namespace,
    pub(crate) programs: HashMap<u32, Program>,
    pub(crate) literal_strings: LiteralStringsPool,
    pub(crate) execution: ExecutionContext,
    pub(crate) error_message: Option<String>,
    pub(crate) bool_usage: TypeUsage,
    pub(crate) char_pointer_usage: TypeUsage,
}

impl Environment {
    pub fn new() -> Self {
        let mut environment = Self {
            global: Namespace::new(Identifier::new("")),
            programs: HashMap::new(),
            literal_strings: LiteralStringsPool::new(),
            execution: ExecutionContext::new(),
            error_message: None,
            bool_usage: TypeUsage::default(),
            char_pointer_usage: TypeUsage::default(),
        };
        environment.register_built_in_types();
        environment.bool_usage = environment.get_type_usage("bool");
        environment.char_pointer_usage = environment.get_type_usage("const char*");
        environment
    }

    fn register_built_in_types(&mut self) {
        let built_ins: [(&str, usize); 10] = [
            ("int", mem::size_of::<i32>()),
            ("uint32_t", mem::size_of::<u32>()),
            ("size_t", mem::size_of::<usize>()),
            ("char", mem::size_of::<i8>()),
            ("bool", mem::size_of::<bool>()),
            ("uint8_t", mem::size_of::<u8>()),
            ("short", mem::size_of::<i16>()),
            ("uint16_t", mem::size_of::<u16>()),
            ("float", mem::size_of::<f32>()),
            ("double", mem::size_of::<f64>()),
        ];
        for (name, size) in built_ins {
            let ty = self.register_type(name, TypeKind::BuiltIn);
            ty.set_size(size);
        }
    }

    /// `"A::B::Foo"` gibi nitelikli isimler alt namespace'lere kaydedilir.
    pub fn register_type(&mut self, name: &str, kind: TypeKind) -> TypeRef {
        self.global.register_type(name, kind)
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.global.get_type(name)
    }

    pub fn register_function(&mut self, name: &str) -> FunctionRef {
        self.global.register_function(name)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionRef> {
        self.global.get_function(name)
    }

    pub fn get_functions(&self, name: &str) -> Option<&Vec<FunctionRef>> {
        self.global.get_functions(name)
    }

    /// Metinsel tip yazimi: "const Foo&", "int*" gibi. Taban isim mevcut
    /// bir tipe cozulmezse `ty` bos kalir.
    pub fn get_type_usage(&self, spelling: &str) -> TypeUsage {
        let mut type_usage = TypeUsage::default();
        let mut rest = spelling.trim();

        if let Some(stripped) = rest.strip_prefix("const ") {
            type_usage.constant = true;
            rest = stripped;
        }

        if let Some(position) = rest.find('*') {
            type_usage.pointer_level = 1;
            rest = &rest[..position];
        } else if let Some(position) = rest.find('&') {
            type_usage.reference = true;
            rest = &rest[..position];
        }

        type_usage.ty = self.get_type(rest.trim());
        type_usage
    }

    /// Host'a ait bir global'i betige acar; var olan instance guncellenir.
    pub fn set_variable(&mut self, type_usage: &TypeUsage, name: &str, value: &Value) {
        self.global
            .set_variable(type_usage, Identifier::new(name), value);
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.global.get_variable(&Identifier::new(name))
    }

    /// Derler ve hemen calistirir. Hata durumunda bicimlenmis mesaj
    /// `error_message()` ile de okunabilir.
    pub fn load(&mut self, program_name: &str, code: &str) -> Result<(), ScriptError> {
        self.error_message = None;

        let preprocessed = preprocess(code);
        let tokens = tokenize(&preprocessed);
        let mut parsing = ParsingContext::new(preprocessed, tokens);

        let statements = match self.parse(&mut parsing) {
            Ok(statements) => statements,
            Err(error) => {
                let message = error.to_string();
                tracing::debug!(program = program_name, error = %message, "compile failed");
                self.error_message = Some(message);
                return Err(error.into());
            }
        };
        tracing::debug!(
            program = program_name,
            statements = statements.len(),
            "program compiled"
        );

        let key = hash(program_name);
        self.programs.insert(
            key,
            Program {
                name: program_name.to_string(),
                code: code.to_string(),
                statements: statements.clone(),
            },
        );

        let mut ctx = mem::take(&mut self.execution);
        ctx.current_line = 0;
        ctx.jump_statement = JumpStatement::None;

        let result = self.execute_program(&mut ctx, &statements);
        if result.is_err() {
            // blok scope'lari temizlenir, global'ler yerinde kalir
            self.global.release_instances(1);
            ctx.scope_level = 0;
            ctx.jump_statement = JumpStatement::None;
        }
        self.execution = ctx;

        match result {
            Ok(()) => Ok(()),
            Err(error) => {
                let message = error.to_string();
                tracing::debug!(program = program_name, error = %message, "runtime failed");
                self.error_message = Some(message);
                Err(error.into())
            }
        }
    }

    /// Son `load` hatasinin bicimlenmis hali:
    /// "[Compile Error] Line N: ..." ya da "[Runtime Error] Line N: ...".
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Global namespace'teki instance sayisi; scope disiplini testleri
    /// ve host tanilamasi icin.
    pub fn instance_count(&self) -> usize {
        self.global.instance_count()
    }

    /// Yuklu programa isimle erisim (kaynak ve AST).
    pub fn get_program(&self, name: &str) -> Option<&Program> {
        self.programs.get(&hash(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_types_are_registered() {
        let environment = Environment::new();
        for name in [
            "int", "uint32_t", "size_t", "char", "bool", "uint8_t", "short", "uint16_t", "float",
            "double",
        ] {
            assert!(environment.get_type(name).is_some(), "missing {}", name);
        }
        assert_eq!(environment.get_type("int").unwrap().size(), 4);
        assert_eq!(
            environment.get_type("size_t").unwrap().size(),
            mem::size_of::<usize>()
        );
    }

    #[test]
    fn textual_type_usage_parsing() {
        let environment = Environment::new();

        let plain = environment.get_type_usage("int");
        assert!(plain.ty.is_some());
        assert!(!plain.is_pointer());
        assert!(!plain.constant);

        let pointer = environment.get_type_usage("int*");
        assert_eq!(pointer.pointer_level, 1);

        let const_ref = environment.get_type_usage("const float&");
        assert!(const_ref.constant);
        assert!(const_ref.is_reference());
        assert!(const_ref.ty.is_some());

        let unknown = environment.get_type_usage("NoSuchType");
        assert!(unknown.ty.is_none());
    }

    #[test]
    fn set_and_get_variable_round_trip() {
        let mut environment = Environment::new();
        let usage = environment.get_type_usage("int");

        let mut value = Value::with_heap(usage.clone());
        value.write::<i32>(41);
        environment.set_variable(&usage, "answer", &value);

        let stored = environment.get_variable("answer").expect("stored variable");
        assert_eq!(stored.read::<i32>(), 41);

        value.write::<i32>(42);
        environment.set_variable(&usage, "answer", &value);
        assert_eq!(environment.get_variable("answer").unwrap().read::<i32>(), 42);
    }
}
