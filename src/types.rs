//! Tip modeli: Identifier, Type, TypeUsage, Member, Method, Function.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::ast::FunctionDeclaration;
use crate::value::Value;

/// FNV-1a, 32 bit.
pub fn hash(name: &str) -> u32 {
    const OFFSET_BASIS: u32 = 2166136261;
    const FNV_PRIME: u32 = 16777619;

    let mut h = OFFSET_BASIS;
    for b in name.bytes() {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Isim + hash cifti. Esitlik hash uzerinden; isim tanilama icin saklanir.
#[derive(Clone)]
pub struct Identifier {
    pub name: String,
    pub hash: u32,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let hash = hash(&name);
        Self { name, hash }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    BuiltIn,
    Struct,
    Class,
}

/// Kayan nokta olmayan her built-in tamsayi sayilir (bool ve char dahil).
pub fn is_integer(ty: &Type) -> bool {
    ty.kind == TypeKind::BuiltIn && !is_decimal(ty)
}

pub fn is_decimal(ty: &Type) -> bool {
    ty.kind == TypeKind::BuiltIn
        && (ty.identifier.name.starts_with("float") || ty.identifier.name == "double")
}

/// Kaydedilir ama denetlenmez.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

pub type TypeRef = Rc<Type>;

/// Kayitli bir tip. Boyut ve uye/metot listeleri kayit sirasinda host
/// tarafindan doldurulur; sonrasinda degismez.
pub struct Type {
    pub identifier: Identifier,
    pub kind: TypeKind,
    size: Cell<usize>,
    members: RefCell<Vec<Member>>,
    methods: RefCell<Vec<Method>>,
}

impl Type {
    pub fn new(identifier: Identifier, kind: TypeKind) -> TypeRef {
        Rc::new(Self {
            identifier,
            kind,
            size: Cell::new(0),
            members: RefCell::new(Vec::new()),
            methods: RefCell::new(Vec::new()),
        })
    }

    pub fn size(&self) -> usize {
        self.size.get()
    }

    pub fn set_size(&self, size: usize) {
        self.size.set(size);
    }

    pub fn add_member(&self, member: Member) {
        self.members.borrow_mut().push(member);
    }

    pub fn add_method(&self, method: Method) {
        self.methods.borrow_mut().push(method);
    }

    pub fn member(&self, identifier: &Identifier) -> Option<Member> {
        self.members
            .borrow()
            .iter()
            .find(|m| m.identifier == *identifier)
            .cloned()
    }

    pub fn method(&self, identifier: &Identifier) -> Option<Method> {
        self.methods
            .borrow()
            .iter()
            .find(|m| m.identifier == *identifier)
            .cloned()
    }

    pub fn default_constructor(&self) -> Option<Method> {
        self.methods
            .borrow()
            .iter()
            .find(|m| m.parameters.is_empty() && m.identifier == self.identifier)
            .cloned()
    }

    /// Turetilmis tip kaydi: taban tipin uyeleri ve metotlari kopyalanir.
    pub fn copy_contents_from(&self, base: &Type) {
        for member in base.members.borrow().iter() {
            self.members.borrow_mut().push(member.clone());
        }
        for method in base.methods.borrow().iter() {
            self.methods.borrow_mut().push(method.clone());
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("size", &self.size.get())
            .finish()
    }
}

/// Bir tipin kullanim yerindeki bicimi: pointer seviyesi, dizi boyutu,
/// const/reference isaretleri.
#[derive(Clone)]
pub struct TypeUsage {
    pub ty: Option<TypeRef>,
    pub array_size: u16,
    pub pointer_level: u8,
    pub constant: bool,
    pub reference: bool,
}

impl Default for TypeUsage {
    fn default() -> Self {
        Self {
            ty: None,
            array_size: 1,
            pointer_level: 0,
            constant: false,
            reference: false,
        }
    }
}

impl TypeUsage {
    pub fn of(ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            ..Default::default()
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_level > 0
    }

    pub fn is_reference(&self) -> bool {
        self.reference
    }

    /// Pointer ve reference kullanimlar makine kelimesi boyutundadir;
    /// digerleri tip boyutu * dizi boyutu.
    pub fn get_size(&self) -> usize {
        if self.is_pointer() || self.reference {
            return mem::size_of::<usize>();
        }
        match &self.ty {
            Some(ty) => ty.size() * self.array_size as usize,
            None => 0,
        }
    }

    /// Ayni depolamaya yazilabilir mi: tip kimligi, pointer seviyesi ve
    /// dizi boyutu eslesmeli. Const farki kopyayi engellemez.
    pub fn compatible_with(&self, other: &TypeUsage) -> bool {
        type_identity_eq(&self.ty, &other.ty)
            && self.pointer_level == other.pointer_level
            && self.array_size == other.array_size
    }
}

impl PartialEq for TypeUsage {
    fn eq(&self, other: &Self) -> bool {
        type_identity_eq(&self.ty, &other.ty)
            && self.array_size == other.array_size
            && self.pointer_level == other.pointer_level
            && self.constant == other.constant
            && self.reference == other.reference
    }
}

fn type_identity_eq(a: &Option<TypeRef>, b: &Option<TypeRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl fmt::Debug for TypeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constant {
            write!(f, "const ")?;
        }
        match &self.ty {
            Some(ty) => write!(f, "{}", ty.identifier)?,
            None => write!(f, "void")?,
        }
        for _ in 0..self.pointer_level {
            write!(f, "*")?;
        }
        if self.reference {
            write!(f, "&")?;
        }
        Ok(())
    }
}

/// Bir aggregate icindeki alan. Offset host tarafinin dogal bellek
/// yerlesimiyle eslesmek zorundadir; deger gorunumleri bu offset ile
/// olusturulur.
#[derive(Clone, Debug)]
pub struct Member {
    pub identifier: Identifier,
    pub type_usage: TypeUsage,
    pub offset: u16,
    pub visibility: Visibility,
}

impl Member {
    pub fn new(name: &str, type_usage: TypeUsage, offset: u16) -> Self {
        Self {
            identifier: Identifier::new(name),
            type_usage,
            offset,
            visibility: Visibility::Public,
        }
    }
}

/// Metot govdesi: (this pointer'i, argumanlar, donus degeri).
pub type MethodBody = Rc<dyn Fn(&Value, &mut [Value], Option<&mut Value>)>;

/// Host tarafindan kaydedilen metot. Kurucular tip adini tasir,
/// yikicilar '~' onekini.
#[derive(Clone)]
pub struct Method {
    pub identifier: Identifier,
    pub return_type: TypeUsage,
    pub parameters: Vec<TypeUsage>,
    pub visibility: Visibility,
    pub body: MethodBody,
}

impl Method {
    pub fn new(
        name: &str,
        body: impl Fn(&Value, &mut [Value], Option<&mut Value>) + 'static,
    ) -> Self {
        Self {
            identifier: Identifier::new(name),
            return_type: TypeUsage::default(),
            parameters: Vec::new(),
            visibility: Visibility::Public,
            body: Rc::new(body),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("identifier", &self.identifier)
            .field("return_type", &self.return_type)
            .field("parameters", &self.parameters)
            .finish()
    }
}

pub type NativeBody = Rc<dyn Fn(&mut [Value], Option<&mut Value>)>;

/// Serbest fonksiyonun govdesi: host closure'i ya da betik icinde
/// bildirilen bir fonksiyonun AST'si.
#[derive(Clone)]
pub enum FunctionBody {
    /// Kaydedildi, govde henuz baglanmadi; cagrilirsa hicbir sey yapmaz.
    Unbound,
    Native(NativeBody),
    Script(Rc<FunctionDeclaration>),
}

pub type FunctionRef = Rc<RefCell<Function>>;

pub struct Function {
    pub identifier: Identifier,
    pub return_type: TypeUsage,
    pub parameters: Vec<TypeUsage>,
    pub body: FunctionBody,
}

impl Function {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            return_type: TypeUsage::default(),
            parameters: Vec::new(),
            body: FunctionBody::Unbound,
        }
    }

    pub fn set_native(&mut self, body: impl Fn(&mut [Value], Option<&mut Value>) + 'static) {
        self.body = FunctionBody::Native(Rc::new(body));
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("identifier", &self.identifier)
            .field("return_type", &self.return_type)
            .field("parameters", &self.parameters)
            .finish()
    }
}
