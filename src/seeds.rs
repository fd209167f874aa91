//! Built-in reference content: region fact sheets for the comparator,
//! map regions, and the guided relief tour.

use crate::domain::{MapRegion, RegionSheet, ReliefTourStep, TerrainRegion, TourQuiz};

/// (name, relief, rivers, population, resources, climate, economy)
const SHEETS: &[[&str; 7]] = &[
  [
    "Muntenia",
    "Câmpie în sud, dealuri în centru și munți în nord (Carpații Meridionali).",
    "Dunărea, Olt, Argeș, Ialomița, Dâmbovița.",
    "Cea mai populată regiune a României, cu densitate mare în sud și în marile orașe (București).",
    "Petrol și gaze naturale (zona Ploiești), cărbune, materiale de construcții și terenuri agricole fertile.",
    "Climat temperat-continental, cu veri calde și ierni moderate în sud, și influențe montane în nord.",
    "Diversificată, cu industrie petrolieră, agricultură intensivă, servicii concentrate în București.",
  ],
  [
    "Moldova",
    "Câmpii și podișuri în est, dealuri subcarpatice și munți (Carpații Orientali) în vest.",
    "Siret, Prut, Moldova, Bistrița, Trotuș.",
    "Densitate medie a populației, cu concentrări urbane în Iași, Bacău, Suceava.",
    "Sare, petrol (zona Bacău), păduri, terenuri agricole.",
    "Climat temperat-continental cu influențe estice, veri călduroase și ierni reci.",
    "Predominant agricolă, cu industrie alimentară, textilă și IT în dezvoltare în Iași.",
  ],
  [
    "Transilvania",
    "Podiș depresionar înconjurat de lanțurile Carpaților.",
    "Mureș, Someș, Olt, Târnave, Crișuri.",
    "Densitate moderată, cu diversitate etnică și concentrări în Cluj-Napoca, Brașov, Sibiu.",
    "Gaze naturale, aur, argint, sare, lemn, resurse geotermale.",
    "Climat temperat-continental moderat, cu influențe oceanice, adăpostit de lanțurile montane.",
    "Diversificată, cu industrie prelucrătoare, IT, turism și agricultură mixtă.",
  ],
  [
    "Dobrogea",
    "Podiș, câmpie și Delta Dunării.",
    "Dunărea și canalele din Delta Dunării.",
    "Densitate relativ scăzută, cu multe localități rurale și concentrări în Constanța și Tulcea.",
    "Resurse marine, granit, calcar, minereu de fier, terenuri agricole.",
    "Climat temperat-continental cu influențe pontice, cel mai arid din România.",
    "Turism sezonier, agricultură, pescuit, transport naval prin portul Constanța.",
  ],
  [
    "Banat",
    "Câmpie în vest, dealuri și munți în est (Carpații Occidentali).",
    "Timiș, Bega, Caraș, Nera, Cerna.",
    "Densitate medie, cu diversitate etnică și concentrare urbană în Timișoara.",
    "Cărbune, minereuri neferoase, petrol, marmură, păduri.",
    "Climat temperat-continental cu influențe mediteraneene, cel mai blând din România.",
    "Industrie diversificată, agricultură performantă, servicii IT concentrate în Timișoara.",
  ],
  [
    "Maramureș",
    "Relief predominant montan cu depresiuni intramontane.",
    "Tisa, Vișeu, Iza, Someș.",
    "Densitate moderată, cu așezări tradiționale și rurale bine păstrate.",
    "Aur, argint, cupru, lemn, sare.",
    "Climat temperat-continental cu influențe nordice, ierni lungi și reci.",
    "Industria lemnului, minerit în declin, turism rural și agroturism.",
  ],
  [
    "Crișana",
    "Câmpie în vest și dealuri în est.",
    "Crișul Alb, Crișul Negru, Crișul Repede, Barcău.",
    "Densitate moderată, cu așezări urbane concentrate în Oradea și Arad.",
    "Petrol, gaze naturale, bauxită, terenuri agricole fertile.",
    "Climat temperat-continental moderat, cu influențe oceanice și submediteraneene.",
    "Agricultură, industrie alimentară, industrie de componente auto.",
  ],
];

fn sheet_from_row(row: &[&str; 7]) -> RegionSheet {
  RegionSheet {
    name: row[0].into(),
    relief: row[1].into(),
    rivers: row[2].into(),
    population: row[3].into(),
    resources: row[4].into(),
    climate: row[5].into(),
    economy: row[6].into(),
  }
}

/// All known region sheets, in display order.
pub fn region_sheets() -> Vec<RegionSheet> {
  SHEETS.iter().map(sheet_from_row).collect()
}

/// Sheet for `name` (case-insensitive). Unknown regions get placeholder text
/// for every field rather than an error, so the comparator can still render.
pub fn region_sheet(name: &str) -> RegionSheet {
  let wanted = name.trim().to_lowercase();
  SHEETS
    .iter()
    .find(|row| row[0].to_lowercase() == wanted)
    .map(sheet_from_row)
    .unwrap_or_else(|| RegionSheet {
      name: name.trim().to_string(),
      relief: "Informații despre relief nedisponibile.".into(),
      rivers: "Informații despre râuri nedisponibile.".into(),
      population: "Informații despre populație nedisponibile.".into(),
      resources: "Informații despre resurse nedisponibile.".into(),
      climate: "Informații despre climă nedisponibile.".into(),
      economy: "Informații despre economie nedisponibile.".into(),
    })
}

pub fn map_regions() -> Vec<MapRegion> {
  vec![MapRegion {
    id: "transilvania".into(),
    name: "Transilvania".into(),
    coordinates: [24.0, 46.5],
    description: "Regiune istorică din centrul României, cunoscută pentru peisajele sale montane și tradițiile sale bogate.".into(),
    facts: vec![
      "Este înconjurată de lanțuri montane: Carpații Orientali, Carpații Meridionali și Carpații Occidentali".into(),
      "Găzduiește cel mai mare număr de cetăți medievale din România".into(),
      "Este cunoscută pentru diversitatea sa culturală și etnică".into(),
    ],
    resources: vec![
      "Resurse forestiere".into(),
      "Minerale (aur, argint, cupru)".into(),
      "Pășuni și terenuri agricole".into(),
    ],
    protected_areas: vec![
      "Parcul Național Retezat".into(),
      "Parcul Național Piatra Craiului".into(),
      "Rezervația Naturală Cheile Turzii".into(),
    ],
  }]
}

pub fn map_region(id: &str) -> Option<MapRegion> {
  map_regions().into_iter().find(|r| r.id == id)
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Regions for the 3D map, with elevation, population and vegetation.
pub fn terrain_regions() -> Vec<TerrainRegion> {
  vec![
    TerrainRegion {
      region: MapRegion {
        id: "transilvania".into(),
        name: "Transilvania".into(),
        coordinates: [24.0, 46.5],
        description: "Regiune istorică din centrul României, cunoscută pentru peisajele sale montane și tradițiile sale bogate.".into(),
        facts: strings(&[
          "Găzduiește cel mai mare număr de cetăți medievale din Europa",
          "Este locul de origine al legendei lui Dracula",
          "Are cea mai mare densitate de biserici fortificate din Europa",
        ]),
        resources: strings(&["Resurse forestiere", "Minerit", "Turism cultural și natural"]),
        protected_areas: strings(&[
          "Parcul Național Retezat",
          "Parcul Național Piatra Craiului",
          "Rezervația Naturală Cheile Turzii",
        ]),
      },
      elevation: 800,
      population: 6_500_000,
      main_cities: strings(&["Cluj-Napoca", "Brașov", "Sibiu", "Târgu Mureș"]),
      climate: "Temperat continental".into(),
      vegetation: strings(&["Păduri de conifere", "Păduri de foioase", "Pajiști alpine"]),
    },
    TerrainRegion {
      region: MapRegion {
        id: "dobrogea".into(),
        name: "Dobrogea".into(),
        coordinates: [28.5, 44.5],
        description: "Regiune din sud-estul României, mărginită de Marea Neagră și Dunăre, cunoscută pentru delta sa și stațiunile sale de pe litoral.".into(),
        facts: strings(&[
          "Găzduiește Delta Dunării, cea mai mare deltă din Europa",
          "A fost locuită de greci încă din antichitate",
          "Are cea mai lungă perioadă de insolație din România",
        ]),
        resources: strings(&["Resurse piscicole", "Turism balnear", "Agricultură"]),
        protected_areas: strings(&[
          "Delta Dunării",
          "Rezervația Naturală Cheile Dobrogei",
          "Parcul Natural Măcin",
        ]),
      },
      elevation: 200,
      population: 850_000,
      main_cities: strings(&["Constanța", "Tulcea", "Mangalia"]),
      climate: "Mediteranean temperat".into(),
      vegetation: strings(&["Stepe", "Vegetație mediteraneană", "Păduri de stejar"]),
    },
    TerrainRegion {
      region: MapRegion {
        id: "moldova".into(),
        name: "Moldova".into(),
        coordinates: [27.0, 47.0],
        description: "Regiune istorică din estul României, cunoscută pentru tradițiile sale, mănăstirile pictate și peisajele sale naturale.".into(),
        facts: strings(&[
          "Găzduiește Mănăstirile Pictate din Bucovina, Patrimoniu UNESCO",
          "Este locul de origine al limbii române literare",
          "Are cea mai mare concentrație de mănăstiri ortodoxe din România",
        ]),
        resources: strings(&["Agricultură", "Turism cultural și religios", "Resurse forestiere"]),
        protected_areas: strings(&[
          "Parcul Național Ceahlău",
          "Rezervația Naturală Pădurea Slătioara",
          "Parcul Natural Vânători-Neamț",
        ]),
      },
      elevation: 400,
      population: 4_500_000,
      main_cities: strings(&["Iași", "Bacău", "Piatra Neamț", "Suceava"]),
      climate: "Temperat continental".into(),
      vegetation: strings(&["Păduri de foioase", "Păduri de conifere", "Pajiști"]),
    },
  ]
}

pub fn terrain_region(id: &str) -> Option<TerrainRegion> {
  terrain_regions().into_iter().find(|r| r.region.id == id)
}

/// Guided tour steps for a relief unit, keyed by slug (e.g. "carpatii-meridionali").
pub fn relief_tour(id: &str) -> Option<Vec<ReliefTourStep>> {
  match id {
    "carpatii-meridionali" => Some(vec![
      step(
        "Localizare și delimitare",
        "Carpații Meridionali sunt situați în partea central-sudică a României, între Valea Prahovei la est și Defileul Dunării la vest. Sunt delimitați la nord de Depresiunea Brașovului și la sud de Subcarpații Getici și Podișul Mehedinți.",
        Some("https://upload.wikimedia.org/wikipedia/commons/6/6e/Carpatii_Meridionali.png"),
      ),
      step(
        "Caracteristici fizico-geografice",
        "Carpații Meridionali sunt cei mai înalți munți din România, cu vârfuri ce depășesc 2500 m (Moldoveanu 2544 m, Negoiu 2535 m). Relieful este alpin, cu creste, platouri glaciare, circuri și văi glaciare. Clima este aspră, cu precipitații bogate și temperaturi scăzute la altitudine.",
        Some("https://upload.wikimedia.org/wikipedia/commons/2/2d/Muntii_Fagarasului.jpg"),
      ),
      step(
        "Resurse și utilizare",
        "Zona este bogată în resurse forestiere, apă, hidroenergie și are potențial turistic ridicat (drumeții, schi, alpinism). Sunt prezente stațiuni montane renumite: Sinaia, Bușteni, Rânca, Voineasa.",
        None,
      ),
      step(
        "Orașe importante",
        "Orașe situate la poalele Carpaților Meridionali: Brașov, Sibiu, Petroșani, Câmpulung, Curtea de Argeș.",
        None,
      ),
      step(
        "Exemplu de subiect Bac",
        "Prezentați două caracteristici ale reliefului Carpaților Meridionali și două resurse importante ale acestei zone.",
        None,
      ),
      ReliefTourStep {
        quiz: Some(TourQuiz {
          question: "Care este cel mai înalt vârf din Carpații Meridionali?".into(),
          options: vec!["Omu".into(), "Moldoveanu".into(), "Negoiu".into(), "Parângu Mare".into()],
          answer: 1,
        }),
        ..step("Mini-quiz", "Care este cel mai înalt vârf din Carpații Meridionali?", None)
      },
    ]),
    _ => None,
  }
}

fn step(title: &str, content: &str, image_url: Option<&str>) -> ReliefTourStep {
  ReliefTourStep {
    title: title.into(),
    content: content.into(),
    image_url: image_url.map(Into::into),
    quiz: None,
  }
}
