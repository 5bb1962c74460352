//! Host kayit senaryolari: tipler, uyeler, metotlar ve serbest
//! fonksiyonlar betikten kullanilir; bellek yerlesimi host ile paylasilir.

use std::mem;

use bitscript::{Environment, Member, Method, TypeKind, Value};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
struct Vec2 {
    x: f32,
    y: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
struct Node {
    value: i32,
}

fn register_vec2(environment: &mut Environment) {
    let ty = environment.register_type("Vec2", TypeKind::Struct);
    ty.set_size(mem::size_of::<Vec2>());
    ty.add_member(Member::new(
        "x",
        environment.get_type_usage("float"),
        mem::offset_of!(Vec2, x) as u16,
    ));
    ty.add_member(Member::new(
        "y",
        environment.get_type_usage("float"),
        mem::offset_of!(Vec2, y) as u16,
    ));

    // varsayilan kurucu: betikteki `Vec2 v;` bunu cagirir
    ty.add_method(Method::new("Vec2", |this, _args, _ret| {
        // SAFETY: this, kayitli yerlesime sahip bir Vec2 buffer'ina isaret eder.
        let target = unsafe { &mut *this.read::<*mut Vec2>() };
        *target = Vec2 { x: 0.0, y: 0.0 };
    }));

    let mut scale = Method::new("scale", |this, args, _ret| {
        // SAFETY: this kayitli Vec2 buffer'i; arguman float tasir.
        let target = unsafe { &mut *this.read::<*mut Vec2>() };
        let factor = args[0].read::<f32>();
        target.x *= factor;
        target.y *= factor;
    });
    scale
        .parameters
        .push(environment.get_type_usage("float"));
    ty.add_method(scale);

    let mut length = Method::new("length", |this, _args, ret| {
        // SAFETY: this kayitli Vec2 buffer'i.
        let target = unsafe { &*this.read::<*const Vec2>() };
        if let Some(ret) = ret {
            ret.write::<f32>((target.x * target.x + target.y * target.y).sqrt());
        }
    });
    length.return_type = environment.get_type_usage("float");
    ty.add_method(length);

    let mut plus = Method::new("operator+", |this, args, ret| {
        // SAFETY: this kayitli Vec2 buffer'i; arguman Vec2 kopyasi tasir.
        let a = unsafe { &*this.read::<*const Vec2>() };
        let b = args[0].read::<Vec2>();
        if let Some(ret) = ret {
            ret.write::<Vec2>(Vec2 {
                x: a.x + b.x,
                y: a.y + b.y,
            });
        }
    });
    plus.return_type = environment.get_type_usage("Vec2");
    plus.parameters.push(environment.get_type_usage("Vec2"));
    ty.add_method(plus);
}

fn register_node(environment: &mut Environment) {
    let ty = environment.register_type("Node", TypeKind::Struct);
    ty.set_size(mem::size_of::<Node>());
    ty.add_member(Member::new(
        "value",
        environment.get_type_usage("int"),
        mem::offset_of!(Node, value) as u16,
    ));
    ty.add_method(Method::new("Node", |this, _args, _ret| {
        // SAFETY: this kayitli Node buffer'ina isaret eder.
        let target = unsafe { &mut *this.read::<*mut Node>() };
        *target = Node { value: 0 };
    }));
}

#[test]
fn struct_members_and_methods_share_bytes_with_the_host() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    environment
        .load("vec", "Vec2 v;\nv.x = 1.0f;\nv.y = 2.0f;\nv.scale(3.0f);\n")
        .unwrap();
    let v = environment.get_variable("v").unwrap().read::<Vec2>();
    assert_eq!(v, Vec2 { x: 3.0, y: 6.0 });
}

#[test]
fn method_calls_compose_in_expressions() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    environment
        .load(
            "len",
            "Vec2 v;\nv.x = 3.0f;\nv.y = 4.0f;\nfloat l = v.length();\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("l").unwrap().read::<f32>(), 5.0);
}

#[test]
fn operator_methods_drive_binary_expressions() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    environment
        .load(
            "plus",
            "Vec2 a;\na.x = 1.0f;\na.y = 2.0f;\nVec2 b;\nb.x = 10.0f;\nb.y = 20.0f;\nVec2 c = a + b;\n",
        )
        .unwrap();
    let c = environment.get_variable("c").unwrap().read::<Vec2>();
    assert_eq!(c, Vec2 { x: 11.0, y: 22.0 });
}

#[test]
fn missing_operator_method_is_a_compile_error() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    assert!(environment
        .load("minus", "Vec2 a;\nVec2 b;\nVec2 c = a - b;\n")
        .is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("invalid operator for the 'Vec2' type"));
}

#[test]
fn null_pointer_member_access_is_caught_before_dereference() {
    let mut environment = Environment::new();
    register_node(&mut environment);
    assert!(environment
        .load("null", "Node* p = nullptr;\nint a = p->value;\n")
        .is_err());
    let message = environment.error_message().unwrap();
    assert!(message.contains("Line 2"), "{}", message);
    assert!(message.contains("null pointer access ('p')"), "{}", message);
}

#[test]
fn pointer_member_access_follows_the_pointer() {
    let mut environment = Environment::new();
    register_node(&mut environment);
    environment
        .load(
            "deref",
            "Node n;\nn.value = 12;\nNode* p = &n;\nint got = p->value;\np->value = 34;\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("got").unwrap().read::<i32>(), 12);
    let n = environment.get_variable("n").unwrap().read::<Node>();
    assert_eq!(n.value, 34);
}

#[test]
fn member_access_operator_must_match_pointerness() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    assert!(environment
        .load("arrow", "Vec2 v;\nv->x = 1.0f;\n")
        .is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("invalid member access operator ('v' is not a pointer)"));
}

#[test]
fn unknown_member_is_a_compile_error() {
    let mut environment = Environment::new();
    register_vec2(&mut environment);
    assert!(environment.load("member", "Vec2 v;\nv.z = 1.0f;\n").is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("no member named 'z'"));
}

#[test]
fn aggregates_without_a_default_constructor_cannot_be_declared_bare() {
    let mut environment = Environment::new();
    let ty = environment.register_type("Bare", TypeKind::Struct);
    ty.set_size(4);
    assert!(environment.load("bare", "Bare b;\n").is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("no default constructor defined for the 'Bare' type"));
}

#[test]
fn reference_parameters_alias_the_callers_storage() {
    let mut environment = Environment::new();
    let function = environment.register_function("bump");
    {
        let mut function = function.borrow_mut();
        function.parameters.push(environment.get_type_usage("int&"));
        function.set_native(|args, _ret| {
            let current = args[0].read::<i32>();
            args[0].write::<i32>(current + 1);
        });
    }

    environment.load("byref", "int x = 1;\nbump(x);\n").unwrap();
    assert_eq!(environment.get_variable("x").unwrap().read::<i32>(), 2);
}

#[test]
fn value_parameters_isolate_the_caller() {
    let mut environment = Environment::new();
    let function = environment.register_function("tweak");
    {
        let mut function = function.borrow_mut();
        function.parameters.push(environment.get_type_usage("int"));
        function.set_native(|args, _ret| {
            args[0].write::<i32>(99);
        });
    }

    environment.load("byval", "int x = 1;\ntweak(x);\n").unwrap();
    assert_eq!(environment.get_variable("x").unwrap().read::<i32>(), 1);
}

#[test]
fn native_functions_return_through_the_out_value() {
    let mut environment = Environment::new();
    let function = environment.register_function("forty_two");
    {
        let mut function = function.borrow_mut();
        function.return_type = environment.get_type_usage("int");
        function.set_native(|_args, ret| {
            if let Some(ret) = ret {
                ret.write::<i32>(42);
            }
        });
    }

    environment.load("ret", "int x = forty_two();\n").unwrap();
    assert_eq!(environment.get_variable("x").unwrap().read::<i32>(), 42);
}

#[test]
fn host_globals_survive_loads_and_feed_scripts() {
    let mut environment = Environment::new();
    let usage = environment.get_type_usage("int");
    let mut seed = Value::with_heap(usage.clone());
    seed.write::<i32>(10);
    environment.set_variable(&usage, "seed", &seed);

    environment.load("first", "int r = seed * 3;\n").unwrap();
    assert_eq!(environment.get_variable("r").unwrap().read::<i32>(), 30);

    environment.load("second", "int r2 = seed + 1;\n").unwrap();
    assert_eq!(environment.get_variable("r2").unwrap().read::<i32>(), 11);
    assert_eq!(environment.get_variable("seed").unwrap().read::<i32>(), 10);
}

#[test]
fn qualified_functions_resolve_through_namespaces() {
    let mut environment = Environment::new();
    let function = environment.register_function("math::double_it");
    {
        let mut function = function.borrow_mut();
        function.return_type = environment.get_type_usage("int");
        function.parameters.push(environment.get_type_usage("int"));
        function.set_native(|args, ret| {
            let input = args[0].read::<i32>();
            if let Some(ret) = ret {
                ret.write::<i32>(input * 2);
            }
        });
    }

    environment
        .load("qualified", "int r = math::double_it(21);\n")
        .unwrap();
    assert_eq!(environment.get_variable("r").unwrap().read::<i32>(), 42);
}

#[test]
fn using_namespace_resolves_registered_types() {
    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: i32,
    }

    let mut environment = Environment::new();
    let ty = environment.register_type("math::Pair", TypeKind::Struct);
    ty.set_size(mem::size_of::<Pair>());
    ty.add_member(Member::new(
        "a",
        environment.get_type_usage("int"),
        mem::offset_of!(Pair, a) as u16,
    ));
    ty.add_member(Member::new(
        "b",
        environment.get_type_usage("int"),
        mem::offset_of!(Pair, b) as u16,
    ));
    ty.add_method(Method::new("Pair", |this, _args, _ret| {
        // SAFETY: this kayitli Pair buffer'ina isaret eder.
        let target = unsafe { &mut *this.read::<*mut Pair>() };
        *target = Pair { a: 0, b: 0 };
    }));

    environment
        .load(
            "ns",
            "using namespace math;\nPair p;\np.a = 4;\np.b = 8;\n",
        )
        .unwrap();
    let p = environment.get_variable("p").unwrap().read::<Pair>();
    assert_eq!(p, Pair { a: 4, b: 8 });
}
