use clap::Parser;
use quill_query::catalog::{ColumnDef, DataType};
use quill_query::config::{DatabaseOptions, ExecutionConfig};
use quill_query::database::Database;
use quill_query::error::QuillQueryResult;
use quill_query::execution::marshal::AttributeValue;
use quill_query::execution::physical_plan::{
    AttributeName, PhysicalDelete, PhysicalPlan, PhysicalSelect,
};
use quill_query::expression::CompareOp;
use quill_query::utils::util::{pretty_format_physical_plan, pretty_format_tuples};

const NAMES: [&str; 6] = ["Ann", "Bo", "Cyrus", "Dee", "Eleanor", "Fitzgerald"];

#[derive(Debug, Parser, PartialEq)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value_t = 8, help = "Employees to insert")]
    rows: u32,
    #[clap(long, default_value_t = 7, help = "Employee id to select and delete")]
    filter_id: i32,
    #[clap(long, help = "Reject numeric text that does not parse completely")]
    strict: bool,
}

fn print_relation(db: &Database, relation: &str) -> QuillQueryResult<()> {
    let layout = db.layout(relation)?;
    let tuples = db.scan_tuples(relation)?;
    println!("{} ({} records)", relation, tuples.len());
    println!("{}", pretty_format_tuples(&layout, &tuples)?);
    Ok(())
}

fn run(args: Args) -> QuillQueryResult<()> {
    let options = DatabaseOptions {
        execution: if args.strict {
            ExecutionConfig::strict()
        } else {
            ExecutionConfig::default()
        },
        ..Default::default()
    };
    let db = Database::new(options);
    db.create_relation(
        "Employees",
        &[
            ColumnDef::integer("id"),
            ColumnDef::string("name", 10),
            ColumnDef::float("salary"),
        ],
    )?;
    db.create_relation("Result", &[ColumnDef::string("name", 10)])?;

    for id in 1..=args.rows {
        let name = NAMES[(id as usize - 1) % NAMES.len()];
        let salary = format!("{}.5", 1000 * id);
        db.insert(
            "Employees",
            vec![
                AttributeValue::text("Employees", "id", DataType::Integer, &id.to_string()),
                AttributeValue::text("Employees", "name", DataType::String, name),
                AttributeValue::text("Employees", "salary", DataType::Float, &salary),
            ],
        )?;
    }
    print_relation(&db, "Employees")?;

    let filter_id = args.filter_id.to_string();
    let filter = AttributeValue::text("Employees", "id", DataType::Integer, &filter_id);
    let plans: Vec<PhysicalPlan> = vec![
        PhysicalSelect::new(
            "Result".to_string(),
            vec![AttributeName::of("Employees", "name")],
            Some(filter),
            CompareOp::Eq,
        )
        .into(),
        PhysicalDelete::new(
            "Employees",
            "id",
            CompareOp::Eq,
            DataType::Integer,
            filter_id.as_bytes(),
        )
        .into(),
        PhysicalSelect::new(
            "Result".to_string(),
            vec![AttributeName::of("Employees", "name")],
            None,
            CompareOp::Eq,
        )
        .into(),
    ];
    println!("{}", pretty_format_physical_plan(&plans));

    for plan in plans.iter() {
        let count = db.execute(plan)?;
        println!("{plan}: {count} records");
    }
    print_relation(&db, "Employees")?;
    print_relation(&db, "Result")?;
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("demo failed: {e}");
        std::process::exit(1);
    }
}
