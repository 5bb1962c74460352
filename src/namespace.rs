//! Sembol kayitlari: Namespace agaci ve Instance listesi.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{hash, Function, FunctionRef, Identifier, Type, TypeKind, TypeRef, TypeUsage};
use crate::value::Value;

/// Bir scope'taki isimli baglanti. Scope seviyesi serbest birakma
/// watermark'i olarak kullanilir.
#[derive(Debug)]
pub struct Instance {
    pub type_usage: TypeUsage,
    pub identifier: Identifier,
    pub scope_level: u32,
    pub value: Value,
}

/// Tipler, fonksiyon listeleri, alt namespace'ler ve instance vektoru.
/// Instance'lar bildirim sirasiyla eklenir ve scope cikisinda sondan
/// geriye dogru atilir.
pub struct Namespace {
    pub identifier: Identifier,
    namespaces: HashMap<u32, Namespace>,
    types: HashMap<u32, TypeRef>,
    functions: HashMap<u32, Vec<FunctionRef>>,
    instances: Vec<Instance>,
}

impl Namespace {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            namespaces: HashMap::new(),
            types: HashMap::new(),
            functions: HashMap::new(),
            instances: Vec::new(),
        }
    }

    fn walk(&self, path: &[&str]) -> Option<&Namespace> {
        let mut current = self;
        for segment in path {
            current = current.namespaces.get(&hash(segment))?;
        }
        Some(current)
    }

    fn walk_or_create(&mut self, path: &[&str]) -> &mut Namespace {
        let mut current = self;
        for segment in path {
            current = current
                .namespaces
                .entry(hash(segment))
                .or_insert_with(|| Namespace::new(Identifier::new(*segment)));
        }
        current
    }

    /// `"A::B::Foo"` gibi nitelikli isimler alt namespace'lere iner.
    pub fn register_type(&mut self, name: &str, kind: TypeKind) -> TypeRef {
        let segments: Vec<&str> = name.split("::").collect();
        let (base, path) = segments.split_last().expect("type name");
        let target = self.walk_or_create(path);
        let ty = Type::new(Identifier::new(*base), kind);
        target.types.insert(hash(base), TypeRef::clone(&ty));
        ty
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        let segments: Vec<&str> = name.split("::").collect();
        let (base, path) = segments.split_last()?;
        let target = self.walk(path)?;
        target.types.get(&hash(base)).cloned()
    }

    /// Ayni isimle tekrar kayit overload listesine eklenir; cozumleme
    /// ilk girdiyi kullanir.
    pub fn register_function(&mut self, name: &str) -> FunctionRef {
        let segments: Vec<&str> = name.split("::").collect();
        let (base, path) = segments.split_last().expect("function name");
        let target = self.walk_or_create(path);
        let function: FunctionRef = Rc::new(RefCell::new(Function::new(Identifier::new(name))));
        target
            .functions
            .entry(hash(base))
            .or_default()
            .push(FunctionRef::clone(&function));
        function
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionRef> {
        self.get_functions(name).and_then(|list| list.first().cloned())
    }

    pub fn get_functions(&self, name: &str) -> Option<&Vec<FunctionRef>> {
        let segments: Vec<&str> = name.split("::").collect();
        let (base, path) = segments.split_last()?;
        let target = self.walk(path)?;
        target.functions.get(&hash(base))
    }

    pub fn register_instance(&mut self, instance: Instance) -> &mut Instance {
        self.instances.push(instance);
        self.instances.last_mut().expect("instance just pushed")
    }

    /// Sondan basa arama: ayni isimden en son bildirileni bulur.
    pub fn retrieve_instance(&self, identifier: &Identifier) -> Option<&Instance> {
        self.instances
            .iter()
            .rev()
            .find(|i| i.identifier == *identifier)
    }

    pub fn retrieve_instance_mut(&mut self, identifier: &Identifier) -> Option<&mut Instance> {
        self.instances
            .iter_mut()
            .rev()
            .find(|i| i.identifier == *identifier)
    }

    /// Scope seviyesi `scope_level` ve ustundeki instance'lari sondan
    /// geriye atar, sonra alt namespace'lere iner.
    pub fn release_instances(&mut self, scope_level: u32) {
        while self
            .instances
            .last()
            .map_or(false, |i| i.scope_level >= scope_level)
        {
            self.instances.pop();
        }
        for ns in self.namespaces.values_mut() {
            ns.release_instances(scope_level);
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Var olan instance'i gunceller, yoksa scope 0'da olusturur. Host
    /// tarafinin global aktarimi bu yoldan gecer.
    pub fn set_variable(&mut self, type_usage: &TypeUsage, identifier: Identifier, value: &Value) {
        if let Some(instance) = self.retrieve_instance_mut(&identifier) {
            instance.type_usage = type_usage.clone();
            instance.value.init_on_heap(type_usage.clone());
            instance.value.set_from(value.data_ptr());
            return;
        }
        let mut stored = Value::new();
        stored.init_on_heap(type_usage.clone());
        stored.set_from(value.data_ptr());
        self.instances.push(Instance {
            type_usage: type_usage.clone(),
            identifier,
            scope_level: 0,
            value: stored,
        });
    }

    pub fn get_variable(&self, identifier: &Identifier) -> Option<&Value> {
        self.retrieve_instance(identifier).map(|i| &i.value)
    }
}
