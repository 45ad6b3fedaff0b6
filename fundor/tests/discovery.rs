use fundor::inventory;
use fundor::prelude::*;

fn gadget_serializer() -> Serializer {
    Serializer::new("GadgetSerializer").field(Field::new("name", FieldKind::String))
}

fn gadget_list() -> ViewSpec {
    ViewSpec::new("GadgetListView")
        .serializer(gadget_serializer())
        .methods([Method::GET, Method::POST])
}

fn gadget_viewset() -> ViewSpec {
    ViewSpec::new("GadgetViewSet")
        .serializer(gadget_serializer())
}

inventory::submit! {
    RouteDescriptor {
        path: "/gadgets/:pk/",
        actions: &[("get", "retrieve"), ("delete", "destroy"), ("not a method", "broken")],
        view: gadget_viewset,
    }
}

inventory::submit! {
    RouteDescriptor {
        path: "/gadgets/",
        actions: &[],
        view: gadget_list,
    }
}

#[test]
fn test_discovered_routes_are_sorted_by_path() {
    let table = RouteTable::discover();
    let paths: Vec<&str> = table.routes().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["/gadgets/", "/gadgets/:pk/"]);
}

#[test]
fn test_invalid_methods_are_dropped() {
    let table = RouteTable::discover();
    let detail = &table.routes()[1];
    assert_eq!(detail.declared_methods(), vec![Method::GET, Method::DELETE]);
    assert_eq!(detail.action_for(&Method::DELETE), Some("destroy"));
}

#[test]
fn test_discovered_routes_generate_schema() {
    let paths = SchemaGenerator::new(RouteTable::discover())
        .get_paths(None)
        .unwrap()
        .unwrap();

    assert_eq!(paths["/gadgets/"]["get"].operation_id, "listGadgets");
    assert_eq!(paths["/gadgets/"]["post"].operation_id, "createGadget");
    assert_eq!(paths["/gadgets/{id}/"]["get"].operation_id, "retrieveGadget");
    assert_eq!(paths["/gadgets/{id}/"]["delete"].operation_id, "destroyGadget");
}
