#![allow(unused)]
extern crate dotshell;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dotshell::prelude::*;
use std::hint::black_box;

/// A model shaped like a large IL2CPP dump: generic containers with self-referential
/// constraints, derived types over instantiations, fields, properties and nested types.
fn build_model(types: usize) -> AnalysisModel {
    let mut builder = ModelBuilder::new("Assembly-CSharp.dll");

    let comparable = builder.add_type(
        "System",
        "IComparable`1",
        TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
        TypeFlavor::Interface,
    );
    let c_t = builder
        .add_generic_param(comparable, "T", GenericParamAttributes::empty())
        .unwrap();

    let mut previous: Option<Token> = None;
    for i in 0..types {
        let ty = builder.add_type(
            "Game.Generated",
            &format!("Component{i}`1"),
            TypeAttributes::PUBLIC,
            TypeFlavor::Class,
        );
        let t = builder
            .add_generic_param(ty, "T", GenericParamAttributes::empty())
            .unwrap();
        builder
            .add_generic_constraint(
                ty,
                t,
                NativeTypeRef::TypeDef(comparable).instantiate(vec![NativeTypeRef::Var(t)]),
            )
            .unwrap();

        match previous {
            Some(parent) => builder
                .set_base(
                    ty,
                    NativeTypeRef::TypeDef(parent).instantiate(vec![NativeTypeRef::Var(t)]),
                )
                .unwrap(),
            None => builder.set_base(ty, NativeTypeRef::object()).unwrap(),
        }

        builder
            .add_field(
                ty,
                "value",
                FieldAttributes::PRIVATE,
                NativeTypeRef::Var(t),
            )
            .unwrap();
        let getter = builder
            .add_method(
                ty,
                "get_Value",
                MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
                MethodImplAttributes::empty(),
                NativeTypeRef::Var(t),
            )
            .unwrap();
        let setter = builder
            .add_method(
                ty,
                "set_Value",
                MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
                MethodImplAttributes::empty(),
                NativeTypeRef::void(),
            )
            .unwrap();
        builder
            .add_param(setter, ParamDescriptor::new("value", NativeTypeRef::Var(t)))
            .unwrap();
        builder
            .add_property(
                ty,
                "Value",
                PropertyAttributes::empty(),
                NativeTypeRef::Var(t),
                Some(getter),
                Some(setter),
            )
            .unwrap();

        if i % 10 == 0 {
            let nested = builder.add_type(
                "",
                "Cache",
                TypeAttributes::NESTED_PUBLIC | TypeAttributes::SEALED,
                TypeFlavor::ValueType,
            );
            builder.set_declaring_type(nested, ty).unwrap();
            builder
                .add_field(
                    nested,
                    "items",
                    FieldAttributes::PUBLIC,
                    NativeTypeRef::Var(t).sz_array(),
                )
                .unwrap();
        }

        previous = Some(ty);
    }

    black_box(c_t);
    builder.build()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("shell_build");
    group.sample_size(10);

    for types in [2_000usize, 20_000] {
        let model = build_model(types);
        group.throughput(Throughput::Elements(model.types().len() as u64));

        group.bench_with_input(BenchmarkId::new("sequential", types), &model, |b, model| {
            b.iter(|| {
                let image = ShellBuilder::new().build(black_box(model)).unwrap();
                black_box(image)
            });
        });

        group.bench_with_input(BenchmarkId::new("parallel", types), &model, |b, model| {
            let builder = ShellBuilder::new().with_config(BuildConfig::parallel());
            b.iter(|| {
                let image = builder.build(black_box(model)).unwrap();
                black_box(image)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
