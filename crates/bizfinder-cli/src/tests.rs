use super::*;

#[test]
fn parses_search_with_defaults() {
    let cli = Cli::try_parse_from(["bizfinder", "search", "Denver"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref place,
            radius: None,
            business_type: BusinessType::All,
            incomplete_only: false,
            csv: None,
            map: None,
            find_websites: false,
        }) if place == "Denver"
    ));
}

#[test]
fn parses_search_with_all_options() {
    let cli = Cli::try_parse_from([
        "bizfinder",
        "search",
        "Boulder, CO",
        "--radius",
        "2.5",
        "--type",
        "restaurants",
        "--incomplete-only",
        "--csv",
        "out.csv",
        "--map",
        "map.html",
        "--find-websites",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Search {
        place,
        radius,
        business_type,
        incomplete_only,
        csv,
        map,
        find_websites,
    }) = cli.command
    else {
        panic!("expected search command");
    };
    assert_eq!(place, "Boulder, CO");
    assert_eq!(radius, Some(2.5));
    assert_eq!(business_type, BusinessType::Restaurants);
    assert!(incomplete_only);
    assert_eq!(csv, Some(PathBuf::from("out.csv")));
    assert_eq!(map, Some(PathBuf::from("map.html")));
    assert!(find_websites);
}

#[test]
fn short_radius_flag_is_accepted() {
    let cli = Cli::try_parse_from(["bizfinder", "search", "Denver", "-r", "10"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search { radius: Some(r), .. }) if (r - 10.0).abs() < f64::EPSILON
    ));
}

#[test]
fn unknown_business_type_is_rejected() {
    let result = Cli::try_parse_from(["bizfinder", "search", "Denver", "--type", "banks"]);
    assert!(result.is_err());
}

#[test]
fn non_numeric_radius_is_rejected() {
    let result = Cli::try_parse_from(["bizfinder", "search", "Denver", "--radius", "far"]);
    assert!(result.is_err());
}

#[test]
fn search_requires_a_place() {
    assert!(Cli::try_parse_from(["bizfinder", "search"]).is_err());
}

#[test]
fn parses_config_command() {
    let cli = Cli::try_parse_from(["bizfinder", "config"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Config)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["bizfinder"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn business_type_maps_to_category_filter() {
    assert_eq!(CategoryFilter::from(BusinessType::All), CategoryFilter::All);
    assert_eq!(
        CategoryFilter::from(BusinessType::Restaurants),
        CategoryFilter::Restaurants
    );
    assert_eq!(CategoryFilter::from(BusinessType::Shops), CategoryFilter::Shops);
}
